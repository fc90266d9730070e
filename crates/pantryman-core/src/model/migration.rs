//! Migration report accumulated while copying a dataset

use std::fmt;

/// Which part of the layout a copied file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Manifest,
    Ingredient,
    Recipe,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileKind::Manifest => "manifest",
            FileKind::Ingredient => "ingredient",
            FileKind::Recipe => "recipe",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    pub kind: FileKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub kind: FileKind,
    pub name: String,
    pub reason: String,
}

/// Outcome of a best-effort dataset copy.
///
/// Per-file failures are recorded here instead of aborting; the caller's
/// policy decides whether the copy is good enough to commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    copied: Vec<CopiedFile>,
    failed: Vec<CopyFailure>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_copied(&mut self, kind: FileKind, name: impl Into<String>) {
        self.copied.push(CopiedFile {
            kind,
            name: name.into(),
        });
    }

    pub fn record_failure(
        &mut self,
        kind: FileKind,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.failed.push(CopyFailure {
            kind,
            name: name.into(),
            reason: reason.into(),
        });
    }

    pub fn copied(&self) -> &[CopiedFile] {
        &self.copied
    }

    pub fn failed(&self) -> &[CopyFailure] {
        &self.failed
    }

    pub fn files_copied(&self) -> usize {
        self.copied.len()
    }

    pub fn files_failed(&self) -> usize {
        self.failed.len()
    }

    pub fn manifest_copied(&self) -> bool {
        self.copied.iter().any(|f| f.kind == FileKind::Manifest)
    }

    pub fn ingredient_records_copied(&self) -> usize {
        self.count_copied(FileKind::Ingredient)
    }

    pub fn recipes_copied(&self) -> usize {
        self.count_copied(FileKind::Recipe)
    }

    fn count_copied(&self, kind: FileKind) -> usize {
        self.copied.iter().filter(|f| f.kind == kind).count()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} file(s) copied ({} ingredient, {} recipe, manifest {}), {} failed",
            self.files_copied(),
            self.ingredient_records_copied(),
            self.recipes_copied(),
            if self.manifest_copied() { "yes" } else { "no" },
            self.files_failed()
        );
        for failure in &self.failed {
            text.push_str(&format!(
                "; {} {}: {}",
                failure.kind, failure.name, failure.reason
            ));
        }
        text
    }
}
