//! Owned handle to a running engine
//!
//! Exactly one engine instance lives behind a handle. Closing is
//! idempotent and also happens on drop, so the engine is released on every
//! exit path.

use pantryman_core::engine_api::{EngineOpener, PantryEngine};
use pantryman_core::errors::{ExError, PantryError};
use pantryman_store::errors::Result;
use std::path::{Path, PathBuf};

pub struct EngineHandle {
    engine: Option<Box<dyn PantryEngine>>,
    root: PathBuf,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("root", &self.root)
            .field("open", &self.is_open())
            .finish()
    }
}

impl EngineHandle {
    /// # Errors
    ///
    /// `EngineInit` if the opener cannot open `root`.
    pub fn open(opener: &dyn EngineOpener, root: &Path) -> Result<Self> {
        let engine = opener.open(root)?;
        Ok(Self {
            engine: Some(engine),
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    /// # Errors
    ///
    /// `NotBound` once the handle is closed.
    pub fn engine(&self) -> Result<&dyn PantryEngine> {
        match &self.engine {
            Some(engine) => Ok(engine.as_ref()),
            None => Err(Self::closed_error()),
        }
    }

    /// # Errors
    ///
    /// `NotBound` once the handle is closed.
    pub fn engine_mut(&mut self) -> Result<&mut dyn PantryEngine> {
        match &mut self.engine {
            Some(engine) => Ok(engine.as_mut()),
            None => Err(Self::closed_error()),
        }
    }

    /// Release the engine. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.close();
            tracing::debug!(root = %self.root.display(), "Engine handle released");
        }
    }

    fn closed_error() -> ExError {
        ExError::from(PantryError::NotBound).with_op("engine_handle")
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.close();
    }
}
