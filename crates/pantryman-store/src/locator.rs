//! Active storage root resolution
//!
//! Reads the persisted `data_directory` preference and turns it into a
//! directory the engine can open. Resolution never fails: anything that
//! prevents using the persisted root falls back to the default local root
//! and is reported as a degradation.

use crate::dataset::seed_skeleton;
use crate::errors::{io_error_at, Result};
use crate::grants::TreeResolver;
use crate::prefs::Preferences;
use pantryman_core::config::{AppConfig, PREF_DATA_DIR};
use pantryman_core::errors::ExError;
use pantryman_core::log_degraded;
use pantryman_core::model::StorageRoot;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of resolving the active root
#[derive(Debug, Clone)]
pub struct ResolvedRoot {
    /// Root the caller should bind to
    pub root: StorageRoot,
    /// Local directory backing `root`
    pub path: PathBuf,
    /// Set when a fallback was taken
    pub degradation: Option<ExError>,
}

impl ResolvedRoot {
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

pub struct StorageLocator {
    prefs: Arc<dyn Preferences>,
    resolver: Arc<dyn TreeResolver>,
    default_path: PathBuf,
}

impl std::fmt::Debug for StorageLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageLocator")
            .field("default_path", &self.default_path)
            .finish_non_exhaustive()
    }
}

impl StorageLocator {
    pub fn new(
        prefs: Arc<dyn Preferences>,
        resolver: Arc<dyn TreeResolver>,
        default_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prefs,
            resolver,
            default_path: default_path.into(),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        prefs: Arc<dyn Preferences>,
        resolver: Arc<dyn TreeResolver>,
    ) -> Self {
        Self::new(prefs, resolver, config.default_root_path())
    }

    pub fn default_root(&self) -> StorageRoot {
        StorageRoot::LocalPath(self.default_path.clone())
    }

    /// Persisted root, or the default when none is persisted.
    ///
    /// # Errors
    ///
    /// Fails if the preference store cannot be read.
    pub fn current_root(&self) -> Result<StorageRoot> {
        Ok(self
            .prefs
            .get(PREF_DATA_DIR)?
            .and_then(|value| StorageRoot::from_pref(&value))
            .unwrap_or_else(|| self.default_root()))
    }

    /// Local directory for `root`.
    ///
    /// # Errors
    ///
    /// `PermissionLost` for a granted tree that no longer resolves.
    pub fn resolve_root(&self, root: &StorageRoot) -> Result<PathBuf> {
        match root {
            StorageRoot::LocalPath(path) => Ok(path.clone()),
            StorageRoot::GrantedTree(reference) => self.resolver.resolve(reference),
        }
    }

    /// Record `root` as the active root. Only the switch commit calls this.
    ///
    /// # Errors
    ///
    /// Fails if the preference store cannot be written.
    pub fn persist(&self, root: &StorageRoot) -> Result<()> {
        self.prefs.set(PREF_DATA_DIR, &root.to_pref())
    }

    /// Resolve the root the engine should bind to.
    pub fn resolve_active_root(&self) -> ResolvedRoot {
        let persisted = match self.current_root() {
            Ok(root) => root,
            Err(e) => {
                log_degraded!("resolve_active_root", e.code(), reason = %e);
                return self.fallback(Some(e));
            }
        };

        if persisted == self.default_root() {
            return self.fallback(None);
        }

        match self.resolve_root(&persisted) {
            Ok(path) => ResolvedRoot {
                root: persisted,
                path,
                degradation: None,
            },
            Err(e) => {
                log_degraded!(
                    "resolve_active_root",
                    e.code(),
                    root = %persisted,
                    fallback = %self.default_path.display()
                );
                self.fallback(Some(e))
            }
        }
    }

    fn fallback(&self, degradation: Option<ExError>) -> ResolvedRoot {
        let degradation = match self.ensure_default() {
            Ok(()) => degradation,
            Err(e) => {
                log_degraded!("ensure_default_root", e.code(), reason = %e);
                Some(match degradation {
                    Some(first) => first.with_source(e),
                    None => e,
                })
            }
        };
        ResolvedRoot {
            root: self.default_root(),
            path: self.default_path.clone(),
            degradation,
        }
    }

    /// Create the default root on demand; seed a skeleton into it when it
    /// is brand new or empty.
    fn ensure_default(&self) -> Result<()> {
        let path: &Path = &self.default_path;
        fs::create_dir_all(path).map_err(|e| io_error_at("create_default_root", path, e))?;
        let is_empty = fs::read_dir(path)
            .map_err(|e| io_error_at("read_default_root", path, e))?
            .next()
            .is_none();
        if is_empty {
            seed_skeleton(path)?;
            tracing::info!(root = %path.display(), "Seeded default data directory");
        }
        Ok(())
    }
}
