//! YAML file-backed pantry engine
//!
//! Loads every ingredient record and the manifest at open time and writes
//! each mutation through to disk before updating its in-memory state, so a
//! failed write leaves both untouched.

use crate::dataset::manifest::{PantryItem, PantryManifest};
use crate::dataset::record::IngredientRecord;
use crate::errors::{engine_init, invalid_input, io_error_at, Result};
use pantryman_core::engine_api::{EngineOpener, PantryEngine};
use pantryman_core::errors::{ExError, PantryError};
use pantryman_core::model::layout::is_record_name;
use pantryman_core::model::{
    slug_for, DatasetLayout, Ingredient, IngredientDraft, PantryUpdate,
};
use pantryman_core::{log_op_end, log_op_error, log_op_start};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone)]
struct StoredRecord {
    path: PathBuf,
    record: IngredientRecord,
}

/// Engine over one dataset directory
#[derive(Debug)]
pub struct YamlEngine {
    layout: DatasetLayout,
    records: BTreeMap<String, StoredRecord>,
    manifest: PantryManifest,
    closed: bool,
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

impl YamlEngine {
    /// Open the dataset at `root`.
    ///
    /// # Errors
    ///
    /// `EngineInit` if the root or its `ingredients/` directory is missing,
    /// or if any record or the manifest cannot be parsed.
    pub fn open(root: &Path) -> Result<Self> {
        let start = Instant::now();
        log_op_start!("open_engine", root = %root.display());

        let result = Self::load(root);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(engine) => {
                log_op_end!(
                    "open_engine",
                    duration_ms = duration_ms,
                    ingredient_count = engine.records.len()
                );
            }
            Err(e) => {
                log_op_error!("open_engine", e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(engine_init(root, "data directory does not exist"));
        }
        let layout = DatasetLayout::new(root);
        let ingredients_dir = layout.ingredients_dir();
        if !ingredients_dir.is_dir() {
            return Err(engine_init(root, "ingredients directory not found"));
        }

        let list_failed = |e: std::io::Error| {
            engine_init(root, "cannot list ingredients")
                .with_source(io_error_at("read_dir", &ingredients_dir, e))
        };
        let entries = fs::read_dir(&ingredients_dir).map_err(list_failed)?;

        let mut records: BTreeMap<String, StoredRecord> = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(list_failed)?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if !path.is_file() || !is_record_name(&name) {
                continue;
            }
            let record = IngredientRecord::load(&path)
                .map_err(|e| engine_init(root, format!("bad record {}", name)).with_source(e))?;
            if let Some(previous) = records.get(&record.name) {
                tracing::warn!(
                    ingredient = %record.name,
                    kept = %path.display(),
                    shadowed = %previous.path.display(),
                    "Duplicate ingredient name across record files"
                );
            }
            records.insert(record.name.clone(), StoredRecord { path, record });
        }

        let manifest = PantryManifest::load(&layout.manifest())
            .map_err(|e| engine_init(root, "bad manifest").with_source(e))?
            .unwrap_or_default();

        Ok(Self {
            layout,
            records,
            manifest,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ExError::from(PantryError::NotBound).with_op("yaml_engine"));
        }
        Ok(())
    }

    fn not_found(name: &str) -> ExError {
        PantryError::IngredientNotFound {
            name: name.to_string(),
        }
        .into()
    }

    fn already_exists(name: &str) -> ExError {
        PantryError::IngredientAlreadyExists {
            name: name.to_string(),
        }
        .into()
    }

    fn snapshot(&self, stored: &StoredRecord) -> Ingredient {
        let record = &stored.record;
        let item = self.manifest.item(&record.name);
        Ingredient {
            name: record.name.clone(),
            slug: slug_for(&record.name),
            category: record.category.clone(),
            kb: record.kb.clone(),
            tags: record.tags.iter().cloned().collect(),
            is_in_pantry: item.is_some(),
            quantity: item.and_then(|i| i.quantity),
            quantity_unit: item.and_then(|i| i.quantity_type.clone()),
            last_updated: item.map(|i| i.last_updated.clone()),
        }
    }

    /// Record path for `name`, rejecting a slug already taken by another
    /// ingredient.
    fn record_path_for(&self, name: &str, ignore: Option<&str>) -> Result<PathBuf> {
        let path = self.layout.record_path(&slug_for(name));
        if path.parent() != Some(self.layout.ingredients_dir().as_path()) {
            return Err(invalid_input(
                "record_path",
                format!("'{}' does not map to a single record file", name),
            ));
        }
        let taken = self
            .records
            .iter()
            .any(|(other, stored)| Some(other.as_str()) != ignore && stored.path == path);
        if taken || (ignore.is_none() && path.exists()) {
            return Err(Self::already_exists(name).with_entity(path.display().to_string()));
        }
        Ok(path)
    }

    fn commit_manifest(&mut self, manifest: PantryManifest) -> Result<()> {
        manifest.save(&self.layout.manifest())?;
        self.manifest = manifest;
        Ok(())
    }
}

impl PantryEngine for YamlEngine {
    fn root(&self) -> &Path {
        self.layout.root()
    }

    fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.ensure_open()?;
        Ok(self.records.values().map(|s| self.snapshot(s)).collect())
    }

    fn list_categories(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        let categories: BTreeSet<&str> = self
            .records
            .values()
            .map(|s| s.record.category.as_str())
            .collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }

    fn set_pantry_status(&mut self, name: &str, update: PantryUpdate) -> Result<()> {
        self.ensure_open()?;
        if !self.records.contains_key(name) {
            return Err(Self::not_found(name).with_op("set_pantry_status"));
        }
        let mut manifest = self.manifest.clone();
        match update {
            PantryUpdate::Remove => {
                manifest.remove(name);
            }
            PantryUpdate::Stock { quantity, unit } => manifest.upsert(PantryItem {
                ingredient: name.to_string(),
                quantity: quantity.filter(|q| q.is_finite() && *q > 0.0),
                quantity_type: unit,
                last_updated: today(),
            }),
        }
        self.commit_manifest(manifest)
    }

    fn create_ingredient(&mut self, draft: IngredientDraft) -> Result<()> {
        self.ensure_open()?;
        let draft = draft
            .normalized()
            .map_err(|e| ExError::from(e).with_op("create_ingredient"))?;
        if self.records.contains_key(&draft.name) {
            return Err(Self::already_exists(&draft.name).with_op("create_ingredient"));
        }
        let path = self.record_path_for(&draft.name, None)?;
        let record = IngredientRecord::from_draft(&draft);
        record.save(&path)?;
        tracing::debug!(ingredient = %record.name, path = %path.display(), "Ingredient created");
        self.records
            .insert(record.name.clone(), StoredRecord { path, record });
        Ok(())
    }

    fn update_ingredient(&mut self, old_name: &str, draft: IngredientDraft) -> Result<()> {
        self.ensure_open()?;
        let draft = draft
            .normalized()
            .map_err(|e| ExError::from(e).with_op("update_ingredient"))?;
        let old = self
            .records
            .get(old_name)
            .cloned()
            .ok_or_else(|| Self::not_found(old_name).with_op("update_ingredient"))?;
        let renamed = draft.name != old_name;
        if renamed && self.records.contains_key(&draft.name) {
            return Err(Self::already_exists(&draft.name).with_op("update_ingredient"));
        }

        let path = if renamed {
            let candidate = self.layout.record_path(&slug_for(&draft.name));
            if candidate == old.path {
                candidate
            } else {
                self.record_path_for(&draft.name, Some(old_name))?
            }
        } else {
            old.path.clone()
        };

        let record = IngredientRecord::from_draft(&draft);
        record.save(&path)?;
        if path != old.path {
            fs::remove_file(&old.path).map_err(|e| io_error_at("remove_record", &old.path, e))?;
        }

        if renamed && self.manifest.item(old_name).is_some() {
            let mut manifest = self.manifest.clone();
            manifest.rename(old_name, &draft.name);
            self.commit_manifest(manifest)?;
        }

        self.records.remove(old_name);
        self.records
            .insert(record.name.clone(), StoredRecord { path, record });
        Ok(())
    }

    fn delete_ingredient(&mut self, name: &str) -> Result<()> {
        self.ensure_open()?;
        let stored = self
            .records
            .get(name)
            .ok_or_else(|| Self::not_found(name).with_op("delete_ingredient"))?;
        fs::remove_file(&stored.path).map_err(|e| io_error_at("remove_record", &stored.path, e))?;
        self.records.remove(name);

        if self.manifest.item(name).is_some() {
            let mut manifest = self.manifest.clone();
            manifest.remove(name);
            self.commit_manifest(manifest)?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.records.clear();
            tracing::debug!(root = %self.layout.root().display(), "Engine closed");
        }
    }
}

/// Opens `YamlEngine`s
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEngineOpener;

impl EngineOpener for YamlEngineOpener {
    fn open(&self, root: &Path) -> Result<Box<dyn PantryEngine>> {
        Ok(Box::new(YamlEngine::open(root)?))
    }
}
