//! Storage classification
//!
//! Decides what a candidate root holds without writing anything to it:
//! nothing at all, a usable dataset, or something else.

use pantryman_core::errors::{ExError, PantryError};
use pantryman_core::model::layout::is_record_name;
use pantryman_core::model::DatasetLayout;
use pantryman_core::{log_op_end, log_op_start};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Why a non-empty root is not a usable dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    MissingManifest,
    MissingIngredientsDir,
    NoIngredientRecords,
    /// The root (or its record directory) could not be read
    Unreadable(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingManifest => f.write_str("pantry.yaml manifest is missing"),
            InvalidReason::MissingIngredientsDir => {
                f.write_str("ingredients directory is missing")
            }
            InvalidReason::NoIngredientRecords => {
                f.write_str("ingredients directory holds no .yaml records")
            }
            InvalidReason::Unreadable(detail) => write!(f, "unreadable: {}", detail),
        }
    }
}

/// Classification of a candidate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageClass {
    Empty,
    ValidDataset,
    Invalid(InvalidReason),
}

impl StorageClass {
    pub fn label(&self) -> &'static str {
        match self {
            StorageClass::Empty => "empty",
            StorageClass::ValidDataset => "valid_dataset",
            StorageClass::Invalid(_) => "invalid",
        }
    }

    /// Blocking error for an `Invalid` class; `None` otherwise.
    ///
    /// An unreadable root is inconclusive rather than invalid.
    pub fn rejection(&self, root: &Path) -> Option<ExError> {
        let StorageClass::Invalid(reason) = self else {
            return None;
        };
        let root = root.display().to_string();
        let err = match reason {
            InvalidReason::Unreadable(detail) => PantryError::ValidationInconclusive {
                root,
                reason: detail.clone(),
            },
            other => PantryError::InvalidDataset {
                root,
                reason: other.to_string(),
            },
        };
        Some(ExError::from(err).with_op("classify_root"))
    }
}

/// Classifies candidate roots. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageValidator;

impl StorageValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, root: &Path) -> StorageClass {
        let start = Instant::now();
        log_op_start!("classify_root", root = %root.display());
        let class = classify(root);
        log_op_end!(
            "classify_root",
            duration_ms = start.elapsed().as_millis() as u64,
            class = class.label()
        );
        class
    }
}

/// Classify `root` as Empty, ValidDataset or Invalid.
pub fn classify(root: &Path) -> StorageClass {
    let mut entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            return StorageClass::Invalid(InvalidReason::Unreadable(format!(
                "{}: {}",
                root.display(),
                e
            )))
        }
    };
    match entries.next() {
        None => return StorageClass::Empty,
        Some(Err(e)) => {
            return StorageClass::Invalid(InvalidReason::Unreadable(e.to_string()));
        }
        Some(Ok(_)) => {}
    }

    let layout = DatasetLayout::new(root);
    let ingredients_dir = layout.ingredients_dir();
    if !ingredients_dir.is_dir() {
        return StorageClass::Invalid(InvalidReason::MissingIngredientsDir);
    }
    match has_record(&ingredients_dir) {
        Ok(true) => {}
        Ok(false) => return StorageClass::Invalid(InvalidReason::NoIngredientRecords),
        Err(detail) => return StorageClass::Invalid(InvalidReason::Unreadable(detail)),
    }
    if !layout.manifest().is_file() {
        return StorageClass::Invalid(InvalidReason::MissingManifest);
    }
    StorageClass::ValidDataset
}

fn has_record(dir: &Path) -> std::result::Result<bool, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| e.to_string())?;
        let name = entry.file_name();
        if is_record_name(&name.to_string_lossy()) && entry.path().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(classify(dir.path()), StorageClass::Empty);
    }

    #[test]
    fn test_valid_dataset() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pantry.yaml", "version: 1\nitems: []\n");
        write(dir.path(), "ingredients/salt.yaml", "name: Salt\ncategory: Spices\n");
        assert_eq!(classify(dir.path()), StorageClass::ValidDataset);
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "ingredients/salt.yaml", "name: Salt\n");
        assert_eq!(
            classify(dir.path()),
            StorageClass::Invalid(InvalidReason::MissingManifest)
        );
    }

    #[test]
    fn test_unrelated_files_are_invalid() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "hello");
        assert_eq!(
            classify(dir.path()),
            StorageClass::Invalid(InvalidReason::MissingIngredientsDir)
        );
    }

    #[test]
    fn test_non_yaml_records_do_not_count() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pantry.yaml", "version: 1\n");
        write(dir.path(), "ingredients/salt.yml", "name: Salt\n");
        fs::create_dir_all(dir.path().join("ingredients/nested.yaml")).unwrap();
        assert_eq!(
            classify(dir.path()),
            StorageClass::Invalid(InvalidReason::NoIngredientRecords)
        );
    }

    #[test]
    fn test_missing_root_is_inconclusive() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let class = classify(&missing);
        assert!(matches!(
            class,
            StorageClass::Invalid(InvalidReason::Unreadable(_))
        ));
        let err = class.rejection(&missing).unwrap();
        assert_eq!(
            err.kind(),
            pantryman_core::errors::ExErrorKind::ValidationInconclusive
        );
    }

    #[test]
    fn test_rejection_only_for_invalid() {
        let dir = TempDir::new().unwrap();
        assert!(StorageClass::Empty.rejection(dir.path()).is_none());
        assert!(StorageClass::ValidDataset.rejection(dir.path()).is_none());
        let err = StorageClass::Invalid(InvalidReason::MissingManifest)
            .rejection(dir.path())
            .unwrap();
        assert_eq!(err.kind(), pantryman_core::errors::ExErrorKind::InvalidDataset);
    }
}
