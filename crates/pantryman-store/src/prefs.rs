//! Key/value preference store
//!
//! Holds the persisted active-root value. Writes go through `atomic_write`
//! so a crash mid-write leaves the previous value intact.

use crate::errors::{io_error_at, serialization, Result};
use crate::fs::atomic_write;
use pantryman_core::errors::{ExError, ExErrorKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persisted preference surface
pub trait Preferences: Send + Sync {
    /// # Errors
    ///
    /// Fails if the backing store cannot be read or parsed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Fails if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    ///
    /// Fails if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

fn poisoned(op: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op.to_string())
        .with_message("preference lock poisoned")
}

/// YAML-file backed preferences (a flat string map)
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(io_error_at("read_preferences", &self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_str(&text).map_err(|e| serialization("parse_preferences", &self.path, e))
    }

    fn store(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let text =
            serde_yaml::to_string(map).map_err(|e| serialization("encode_preferences", &self.path, e))?;
        atomic_write(&self.path, text.as_bytes()).map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("write_preferences")
                .with_entity(self.path.display().to_string())
                .with_message("failed to persist preferences")
                .with_source(e)
        })
    }

    fn update<F>(&self, op: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().map_err(|_| poisoned(op))?;
        let mut map = self.load()?;
        mutate(&mut map);
        self.store(&map)
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned("get_preference"))?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update("set_preference", |map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update("remove_preference", |map| {
            map.remove(key);
        })
    }
}

/// Volatile preferences, for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let prefs = Self::new();
        if let Ok(mut values) = prefs.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        prefs
    }
}

impl Preferences for InMemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned("get_preference"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned("set_preference"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned("remove_preference"))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let prefs = FilePreferences::new(dir.path().join("preferences.yaml"));
        assert_eq!(prefs.get("data_directory").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let prefs = FilePreferences::new(dir.path().join("preferences.yaml"));

        prefs.set("data_directory", "/srv/pantry").unwrap();
        prefs.set("theme", "dark").unwrap();
        assert_eq!(
            prefs.get("data_directory").unwrap().as_deref(),
            Some("/srv/pantry")
        );

        prefs.remove("data_directory").unwrap();
        assert_eq!(prefs.get("data_directory").unwrap(), None);
        assert_eq!(prefs.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.yaml");
        FilePreferences::new(&path)
            .set("data_directory", "tree://sd/pantry")
            .unwrap();

        let reopened = FilePreferences::new(&path);
        assert_eq!(
            reopened.get("data_directory").unwrap().as_deref(),
            Some("tree://sd/pantry")
        );
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.yaml");
        fs::write(&path, "- not\n- a map\n").unwrap();

        let err = FilePreferences::new(&path).get("data_directory").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }

    #[test]
    fn test_in_memory_preferences() {
        let prefs = InMemoryPreferences::with_value("data_directory", "/a");
        assert_eq!(prefs.get("data_directory").unwrap().as_deref(), Some("/a"));
        prefs.set("data_directory", "/b").unwrap();
        assert_eq!(prefs.get("data_directory").unwrap().as_deref(), Some("/b"));
    }
}
