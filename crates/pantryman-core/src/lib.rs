//! Pantryman Core - domain model and contracts for the storage lifecycle
//!
//! This crate provides:
//! - Storage root, dataset layout, ingredient and migration report models
//! - The engine request/response contract (`PantryEngine`, `EngineOpener`)
//! - Migration success policies
//! - The structured error facility and logging facility shared by all crates
//! - Application configuration

pub mod config;
pub mod engine_api;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod policy;

pub use pantryman_core_types::schema;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine_api::{EngineOpener, PantryEngine};
pub use errors::{ExError, ExErrorKind, PantryError, Result};
pub use model::{
    DatasetLayout, FileKind, Ingredient, IngredientDraft, MigrationReport, PantryUpdate,
    QuantityUnit, StorageRoot,
};
pub use policy::{MigrationPolicy, PolicyDecision, RequireManifestAndRecord};
