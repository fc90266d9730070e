//! Ingredient record files (`ingredients/<slug>.yaml`)

use crate::errors::{io_error_at, serialization, Result};
use crate::fs::atomic_write;
use pantryman_core::model::IngredientDraft;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub kb: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl IngredientRecord {
    /// Build a record from an already normalized draft
    pub fn from_draft(draft: &IngredientDraft) -> Self {
        Self {
            name: draft.name.clone(),
            category: draft.category.clone(),
            kb: draft.kb.clone(),
            tags: draft.tags.iter().cloned().collect(),
        }
    }

    /// # Errors
    ///
    /// `Io` on read failure, `Serialization` on malformed YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| io_error_at("read_record", path, e))?;
        serde_yaml::from_str(&text).map_err(|e| serialization("parse_record", path, e))
    }

    /// # Errors
    ///
    /// Fails if the record cannot be encoded or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self).map_err(|e| serialization("encode_record", path, e))?;
        atomic_write(path, text.as_bytes())
    }
}
