//! On-disk dataset layout contract
//!
//! ```text
//! <root>/
//!   pantry.yaml          manifest (pantry-wide state)
//!   ingredients/*.yaml   one record per ingredient
//!   recipes/             recipe files (may be empty)
//! ```

use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "pantry.yaml";
pub const INGREDIENTS_DIR: &str = "ingredients";
pub const RECIPES_DIR: &str = "recipes";
pub const RECORD_SUFFIX: &str = ".yaml";

/// Whether a directory entry name denotes an ingredient record file
pub fn is_record_name(name: &str) -> bool {
    name.len() > RECORD_SUFFIX.len() && name.ends_with(RECORD_SUFFIX)
}

/// Paths of the dataset layout below one root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn ingredients_dir(&self) -> PathBuf {
        self.root.join(INGREDIENTS_DIR)
    }

    pub fn recipes_dir(&self) -> PathBuf {
        self.root.join(RECIPES_DIR)
    }

    /// Record file for an ingredient slug
    pub fn record_path(&self, slug: &str) -> PathBuf {
        self.ingredients_dir()
            .join(format!("{}{}", slug, RECORD_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_name_requires_suffix_and_stem() {
        assert!(is_record_name("salt.yaml"));
        assert!(!is_record_name(".yaml"));
        assert!(!is_record_name("salt.yml"));
        assert!(!is_record_name("salt.yaml.bak"));
        assert!(!is_record_name("README"));
    }

    #[test]
    fn test_layout_paths() {
        let layout = DatasetLayout::new("/data");
        assert_eq!(layout.manifest(), PathBuf::from("/data/pantry.yaml"));
        assert_eq!(layout.ingredients_dir(), PathBuf::from("/data/ingredients"));
        assert_eq!(layout.recipes_dir(), PathBuf::from("/data/recipes"));
        assert_eq!(
            layout.record_path("olive_oil"),
            PathBuf::from("/data/ingredients/olive_oil.yaml")
        );
    }
}
