//! Domain model for the storage core
//!
//! Contains the value types that cross crate boundaries: storage roots, the
//! dataset layout contract, ingredient snapshots and migration reports.

pub mod ingredient;
pub mod layout;
pub mod migration;
pub mod storage_root;

pub use ingredient::{slug_for, Ingredient, IngredientDraft, PantryUpdate, QuantityUnit};
pub use layout::DatasetLayout;
pub use migration::{CopiedFile, CopyFailure, FileKind, MigrationReport};
pub use storage_root::{RootKind, StorageRoot};
