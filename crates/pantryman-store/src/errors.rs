//! Error handling for pantryman-store
//!
//! Wraps pantryman-core ExError with store-specific helpers

use pantryman_core::errors::{ExError, ExErrorKind, PantryError};
use std::fmt::Display;
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error that names the path involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_entity(path.display().to_string())
}

/// Create a YAML (de)serialization error
pub fn serialization(operation: &str, path: &Path, err: impl Display) -> ExError {
    ExError::from(PantryError::Serialization {
        message: err.to_string(),
    })
    .with_op(operation.to_string())
    .with_entity(path.display().to_string())
}

/// Create an engine-open failure
pub fn engine_init(root: &Path, reason: impl Into<String>) -> ExError {
    ExError::from(PantryError::EngineInit {
        root: root.display().to_string(),
        reason: reason.into(),
    })
    .with_op("open_engine")
}

/// Create a lost-grant error for a tree reference
pub fn permission_lost(reference: &str) -> ExError {
    ExError::from(PantryError::PermissionLost {
        reference: reference.to_string(),
    })
    .with_op("resolve_tree")
}

/// Create a structural migration failure
pub fn destination_not_writable(path: &Path, err: impl Display) -> ExError {
    ExError::from(PantryError::DestinationNotWritable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
    .with_op("migrate_dataset")
}

/// Create a per-file copy failure
pub fn copy_failed(name: &str, reason: impl Display) -> ExError {
    ExError::from(PantryError::CopyFailed {
        name: name.to_string(),
        reason: reason.to_string(),
    })
    .with_op("copy_file")
}

/// Create an invalid input error
pub fn invalid_input(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_message(reason.into())
}
