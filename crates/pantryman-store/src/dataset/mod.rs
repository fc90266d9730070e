//! File-backed dataset: manifest, ingredient records and the YAML engine

pub mod engine;
pub mod manifest;
pub mod record;

pub use engine::{YamlEngine, YamlEngineOpener};
pub use manifest::{PantryItem, PantryManifest, MANIFEST_VERSION};
pub use record::IngredientRecord;

use crate::errors::{io_error_at, Result};
use pantryman_core::model::DatasetLayout;
use std::fs;
use std::path::Path;

/// Lay down an empty dataset (manifest with no items, empty record and
/// recipe directories). Existing files are left alone.
///
/// # Errors
///
/// Fails if a directory or the manifest cannot be created.
pub fn seed_skeleton(root: &Path) -> Result<()> {
    let layout = DatasetLayout::new(root);
    for dir in [layout.ingredients_dir(), layout.recipes_dir()] {
        fs::create_dir_all(&dir).map_err(|e| io_error_at("seed_skeleton", &dir, e))?;
    }
    let manifest = layout.manifest();
    if !manifest.exists() {
        PantryManifest::empty().save(&manifest)?;
    }
    Ok(())
}
