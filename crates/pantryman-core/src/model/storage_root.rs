//! Storage root identity and its persisted form

use std::fmt;
use std::path::{Path, PathBuf};

/// URI schemes that denote a user-granted tree reference
pub const TREE_SCHEMES: [&str; 2] = ["tree://", "content://"];

/// Discriminator for the two kinds of storage root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    LocalPath,
    GrantedTree,
}

/// A location holding one dataset.
///
/// A local root is a plain directory path. A granted tree is an opaque
/// reference that only resolves to a directory while the grant is held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageRoot {
    LocalPath(PathBuf),
    GrantedTree(String),
}

impl StorageRoot {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        StorageRoot::LocalPath(path.into())
    }

    pub fn granted(reference: impl Into<String>) -> Self {
        StorageRoot::GrantedTree(reference.into())
    }

    /// Parse the persisted preference value.
    ///
    /// Returns `None` for an empty or whitespace-only value, which callers
    /// treat the same as an absent preference.
    pub fn from_pref(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if TREE_SCHEMES.iter().any(|scheme| value.starts_with(scheme)) {
            Some(StorageRoot::GrantedTree(value.to_string()))
        } else {
            Some(StorageRoot::LocalPath(PathBuf::from(value)))
        }
    }

    /// Persisted preference value for this root
    pub fn to_pref(&self) -> String {
        match self {
            StorageRoot::LocalPath(path) => path.to_string_lossy().into_owned(),
            StorageRoot::GrantedTree(reference) => reference.clone(),
        }
    }

    pub fn kind(&self) -> RootKind {
        match self {
            StorageRoot::LocalPath(_) => RootKind::LocalPath,
            StorageRoot::GrantedTree(_) => RootKind::GrantedTree,
        }
    }

    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            StorageRoot::LocalPath(path) => Some(path),
            StorageRoot::GrantedTree(_) => None,
        }
    }
}

impl fmt::Display for StorageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageRoot::LocalPath(path) => write!(f, "{}", path.display()),
            StorageRoot::GrantedTree(reference) => write!(f, "{}", reference),
        }
    }
}
