//! Request/response contract between the storage lifecycle and a pantry engine
//!
//! The switching subsystem only ever talks to an engine through these traits,
//! so any backend that can be opened against a directory can be rebound.

use crate::errors::ExError;
use crate::model::{Ingredient, IngredientDraft, PantryUpdate};
use std::collections::BTreeMap;
use std::path::Path;

/// An open engine bound to exactly one storage root
#[allow(clippy::result_large_err)]
pub trait PantryEngine: Send {
    /// Directory this engine was opened against
    fn root(&self) -> &Path;

    /// All ingredients, sorted by name
    fn list_ingredients(&self) -> Result<Vec<Ingredient>, ExError>;

    /// Ingredients grouped by category; groups and their members sorted
    fn list_ingredients_by_category(&self) -> Result<BTreeMap<String, Vec<Ingredient>>, ExError> {
        let mut grouped: BTreeMap<String, Vec<Ingredient>> = BTreeMap::new();
        for ingredient in self.list_ingredients()? {
            grouped
                .entry(ingredient.category.clone())
                .or_default()
                .push(ingredient);
        }
        Ok(grouped)
    }

    /// Distinct categories, sorted
    fn list_categories(&self) -> Result<Vec<String>, ExError>;

    /// Put an ingredient into the pantry (with optional quantity) or take it out.
    ///
    /// # Errors
    ///
    /// `NotFound` if no ingredient has this name.
    fn set_pantry_status(&mut self, name: &str, update: PantryUpdate) -> Result<(), ExError>;

    /// # Errors
    ///
    /// `AlreadyExists` on a duplicate name, `InvalidInput` on an empty name
    /// or category.
    fn create_ingredient(&mut self, draft: IngredientDraft) -> Result<(), ExError>;

    /// Replace the ingredient named `old_name`; a changed name is a rename.
    ///
    /// # Errors
    ///
    /// `NotFound` if `old_name` is unknown, `AlreadyExists` if the new name
    /// collides with another ingredient.
    fn update_ingredient(&mut self, old_name: &str, draft: IngredientDraft)
        -> Result<(), ExError>;

    /// # Errors
    ///
    /// `NotFound` if no ingredient has this name.
    fn delete_ingredient(&mut self, name: &str) -> Result<(), ExError>;

    /// Flush and release underlying resources. Must be safe to call twice.
    fn close(&mut self) {}
}

/// Opens engines against a storage root
#[allow(clippy::result_large_err)]
pub trait EngineOpener: Send + Sync {
    /// # Errors
    ///
    /// `EngineInit` if the root cannot host an engine.
    fn open(&self, root: &Path) -> Result<Box<dyn PantryEngine>, ExError>;
}
