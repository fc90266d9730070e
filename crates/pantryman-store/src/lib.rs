//! Pantryman Store - filesystem layer for the storage lifecycle
//!
//! Provides:
//! - Atomic writes and copy verification digests
//! - Preference and grant-registry persistence
//! - Active root resolution (`StorageLocator`)
//! - Candidate classification (`StorageValidator`)
//! - Dataset migration (`Migrator`)
//! - The YAML file-backed pantry engine

pub mod dataset;
pub mod errors;
pub mod fs;
pub mod grants;
pub mod locator;
pub mod migrator;
pub mod prefs;
pub mod validator;

// Re-export key types
pub use dataset::{YamlEngine, YamlEngineOpener};
pub use errors::Result;
pub use grants::{GrantRegistry, TreeResolver};
pub use locator::{ResolvedRoot, StorageLocator};
pub use migrator::{FileCopier, Migrator, VerifiedCopier};
pub use prefs::{FilePreferences, InMemoryPreferences, Preferences};
pub use validator::{InvalidReason, StorageClass, StorageValidator};
