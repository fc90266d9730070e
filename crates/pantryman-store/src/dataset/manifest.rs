//! Pantry manifest (`pantry.yaml`)

use crate::errors::{io_error_at, serialization, Result};
use crate::fs::atomic_write;
use pantryman_core::model::QuantityUnit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MANIFEST_VERSION: u8 = 1;

/// One stocked ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub ingredient: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub quantity_type: Option<QuantityUnit>,
    #[serde(default)]
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryManifest {
    pub version: u8,
    #[serde(default)]
    pub items: Vec<PantryItem>,
}

impl Default for PantryManifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl PantryManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            items: Vec::new(),
        }
    }

    /// Read a manifest; `None` when the file does not exist.
    ///
    /// # Errors
    ///
    /// `Io` on read failure, `Serialization` on malformed YAML.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error_at("read_manifest", path, e)),
        };
        serde_yaml::from_str(&text)
            .map(Some)
            .map_err(|e| serialization("parse_manifest", path, e))
    }

    /// # Errors
    ///
    /// Fails if the manifest cannot be encoded or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text =
            serde_yaml::to_string(self).map_err(|e| serialization("encode_manifest", path, e))?;
        atomic_write(path, text.as_bytes())
    }

    pub fn item(&self, ingredient: &str) -> Option<&PantryItem> {
        self.items.iter().find(|i| i.ingredient == ingredient)
    }

    /// Insert or replace the entry for `item.ingredient`
    pub fn upsert(&mut self, item: PantryItem) {
        match self
            .items
            .iter_mut()
            .find(|i| i.ingredient == item.ingredient)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Returns whether an entry was removed
    pub fn remove(&mut self, ingredient: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.ingredient != ingredient);
        self.items.len() != before
    }

    /// Returns whether an entry was renamed
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        match self.items.iter_mut().find(|i| i.ingredient == old) {
            Some(item) => {
                item.ingredient = new.to_string();
                true
            }
            None => false,
        }
    }
}
