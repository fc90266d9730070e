//! Dataset migration between roots
//!
//! Structure creation at the destination is all-or-nothing. After that each
//! file is copied independently: a failed copy is recorded in the
//! `MigrationReport` and the migration carries on with the next file.

use crate::errors::{copy_failed, destination_not_writable, io_error_at, Result};
use crate::fs::{atomic_write, sha256_hex};
use pantryman_core::errors::ExErrorKind;
use pantryman_core::model::layout::is_record_name;
use pantryman_core::model::{DatasetLayout, FileKind, MigrationReport};
use pantryman_core::{log_degraded, log_op_end, log_op_error, log_op_start};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Copies one file. Implementations must not leave a partial target behind.
pub trait FileCopier: Send + Sync {
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Any read, write or verification failure for this one file.
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;
}

/// Reads the source, writes the target atomically and checks the written
/// bytes against the source digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifiedCopier;

impl FileCopier for VerifiedCopier {
    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let content = fs::read(from).map_err(|e| io_error_at("read_source", from, e))?;
        let expected = sha256_hex(&content);
        atomic_write(to, &content)?;

        let written = fs::read(to).map_err(|e| io_error_at("verify_target", to, e))?;
        let actual = sha256_hex(&written);
        if actual != expected {
            fs::remove_file(to).ok();
            return Err(copy_failed(
                &to.display().to_string(),
                format!("digest mismatch: expected {}, got {}", expected, actual),
            ));
        }
        Ok(content.len() as u64)
    }
}

/// Copies a dataset from one root into another
#[derive(Clone)]
pub struct Migrator {
    copier: Arc<dyn FileCopier>,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator").finish_non_exhaustive()
    }
}

impl Migrator {
    pub fn new() -> Self {
        Self::with_copier(Arc::new(VerifiedCopier))
    }

    pub fn with_copier(copier: Arc<dyn FileCopier>) -> Self {
        Self { copier }
    }

    /// Copy the dataset at `source` into `destination`.
    ///
    /// The source is never modified.
    ///
    /// # Errors
    ///
    /// `DestinationNotWritable` if the directory structure cannot be created
    /// at the destination. Per-file failures are reported, not returned.
    pub fn migrate(&self, source: &Path, destination: &Path) -> Result<MigrationReport> {
        let start = Instant::now();
        log_op_start!(
            "migrate_dataset",
            root = %source.display(),
            candidate = %destination.display()
        );

        let result = self.run(source, destination);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(report) => {
                log_op_end!(
                    "migrate_dataset",
                    duration_ms = duration_ms,
                    files_copied = report.files_copied(),
                    files_failed = report.files_failed()
                );
            }
            Err(e) => {
                log_op_error!("migrate_dataset", e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    /// Remove the dataset layout a failed migration left in `destination`,
    /// returning the directory to empty. Only the manifest and the
    /// `ingredients/` and `recipes/` trees are touched.
    ///
    /// # Errors
    ///
    /// `Io` naming the first entry that could not be removed.
    pub fn discard(&self, destination: &Path) -> Result<()> {
        let to = DatasetLayout::new(destination);
        let manifest = to.manifest();
        if manifest.exists() {
            fs::remove_file(&manifest).map_err(|e| io_error_at("discard_migration", &manifest, e))?;
        }
        for dir in [to.ingredients_dir(), to.recipes_dir()] {
            if dir.exists() {
                fs::remove_dir_all(&dir).map_err(|e| io_error_at("discard_migration", &dir, e))?;
            }
        }
        tracing::info!(candidate = %destination.display(), "Discarded partial migration");
        Ok(())
    }

    fn run(&self, source: &Path, destination: &Path) -> Result<MigrationReport> {
        let from = DatasetLayout::new(source);
        let to = DatasetLayout::new(destination);

        for dir in [to.ingredients_dir(), to.recipes_dir()] {
            fs::create_dir_all(&dir).map_err(|e| destination_not_writable(&dir, e))?;
        }

        let mut report = MigrationReport::new();

        let manifest = from.manifest();
        if manifest.is_file() {
            self.copy_one(&mut report, FileKind::Manifest, &manifest, &to.manifest());
        } else {
            tracing::debug!(root = %source.display(), "No manifest at source, skipping");
        }

        for (name, path) in list_entries(&mut report, FileKind::Ingredient, &from.ingredients_dir()) {
            if is_record_name(&name) {
                self.copy_one(
                    &mut report,
                    FileKind::Ingredient,
                    &path,
                    &to.ingredients_dir().join(&name),
                );
            }
        }

        for (name, path) in list_entries(&mut report, FileKind::Recipe, &from.recipes_dir()) {
            if !path.is_dir() {
                self.copy_one(&mut report, FileKind::Recipe, &path, &to.recipes_dir().join(&name));
            }
        }

        tracing::info!(
            files_copied = report.files_copied(),
            files_failed = report.files_failed(),
            "{}",
            report.summary()
        );
        Ok(report)
    }

    fn copy_one(&self, report: &mut MigrationReport, kind: FileKind, from: &Path, to: &Path) {
        let name = from
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.copier.copy(from, to) {
            Ok(bytes) => {
                tracing::trace!(file = %name, bytes, "Copied");
                report.record_copied(kind, name);
            }
            Err(e) => {
                log_degraded!(
                    "migrate_dataset",
                    ExErrorKind::PerFileCopyFailure.code(),
                    file = %name,
                    reason = %e
                );
                report.record_failure(kind, name, e.to_string());
            }
        }
    }
}

/// Entries of a source subdirectory, sorted by name. A missing directory
/// yields nothing; an unreadable one is recorded as a failure.
fn list_entries(
    report: &mut MigrationReport,
    kind: FileKind,
    dir: &Path,
) -> Vec<(String, PathBuf)> {
    if !dir.exists() {
        return Vec::new();
    }
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            let err = io_error_at("list_source", dir, e);
            report.record_failure(kind, dir.display().to_string(), err.to_string());
            return Vec::new();
        }
    };
    let mut listed = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => listed.push((
                entry.file_name().to_string_lossy().into_owned(),
                entry.path(),
            )),
            Err(e) => {
                report.record_failure(kind, dir.display().to_string(), e.to_string());
            }
        }
    }
    listed.sort();
    listed
}
