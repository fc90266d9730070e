//! Registry of user-granted external trees
//!
//! A granted tree is addressed by a `tree://` (or `content://`) reference.
//! The registry maps each reference to the local directory it was granted
//! for; a reference that is unregistered, or whose directory has gone away,
//! has lost its permission.

use crate::errors::{invalid_input, io_error_at, permission_lost, serialization, Result};
use crate::fs::atomic_write;
use pantryman_core::errors::{ExError, ExErrorKind};
use pantryman_core::model::storage_root::TREE_SCHEMES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Resolves granted-tree references to readable directories
pub trait TreeResolver: Send + Sync {
    /// # Errors
    ///
    /// `PermissionLost` if the reference can no longer be accessed.
    fn resolve(&self, reference: &str) -> Result<PathBuf>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GrantFile {
    #[serde(default)]
    grants: BTreeMap<String, PathBuf>,
}

/// YAML-file backed grant registry
#[derive(Debug)]
pub struct GrantRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl GrantRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<GrantFile> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GrantFile::default())
            }
            Err(e) => return Err(io_error_at("read_grants", &self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(GrantFile::default());
        }
        serde_yaml::from_str(&text).map_err(|e| serialization("parse_grants", &self.path, e))
    }

    fn store(&self, file: &GrantFile) -> Result<()> {
        let text =
            serde_yaml::to_string(file).map_err(|e| serialization("encode_grants", &self.path, e))?;
        atomic_write(&self.path, text.as_bytes())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("grant_registry")
                .with_message("grant registry lock poisoned")
        })
    }

    /// Grant access to `directory` under `reference`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the reference has no tree scheme, `Io` if the
    /// directory does not exist.
    pub fn grant(&self, reference: &str, directory: &Path) -> Result<()> {
        if !TREE_SCHEMES.iter().any(|s| reference.starts_with(s)) {
            return Err(invalid_input(
                "grant_tree",
                format!(
                    "reference '{}' must start with one of {:?}",
                    reference, TREE_SCHEMES
                ),
            ));
        }
        let directory = directory
            .canonicalize()
            .map_err(|e| io_error_at("grant_tree", directory, e))?;
        if !directory.is_dir() {
            return Err(invalid_input(
                "grant_tree",
                format!("{} is not a directory", directory.display()),
            ));
        }

        let _guard = self.guard()?;
        let mut file = self.load()?;
        file.grants.insert(reference.to_string(), directory.clone());
        self.store(&file)?;
        tracing::info!(reference, path = %directory.display(), "Tree access granted");
        Ok(())
    }

    /// Drop a grant. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Fails if the registry cannot be read or written.
    pub fn revoke(&self, reference: &str) -> Result<bool> {
        let _guard = self.guard()?;
        let mut file = self.load()?;
        let existed = file.grants.remove(reference).is_some();
        if existed {
            self.store(&file)?;
            tracing::info!(reference, "Tree access revoked");
        }
        Ok(existed)
    }

    /// # Errors
    ///
    /// Fails if the registry cannot be read.
    pub fn list(&self) -> Result<BTreeMap<String, PathBuf>> {
        let _guard = self.guard()?;
        Ok(self.load()?.grants)
    }
}

impl TreeResolver for GrantRegistry {
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let grants = self
            .list()
            .map_err(|e| permission_lost(reference).with_source(e))?;
        match grants.get(reference) {
            Some(path) if path.is_dir() => Ok(path.clone()),
            Some(path) => Err(permission_lost(reference)
                .with_message(format!("granted directory {} is gone", path.display()))),
            None => Err(permission_lost(reference)),
        }
    }
}
