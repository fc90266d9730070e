//! Background work off the caller's thread

use pantryman_core::errors::{ExError, ExErrorKind};
use pantryman_store::errors::Result;
use std::thread::{self, JoinHandle};

/// A unit of slow I/O running on its own thread.
///
/// The caller stays free to poll `is_finished` and collects the value with
/// `wait`. There is no cancellation.
#[derive(Debug)]
pub struct BackgroundTask<T> {
    name: String,
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// # Errors
    ///
    /// `Internal` if the OS refuses to start a thread.
    pub fn spawn<F>(name: &str, work: F) -> Result<Self>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("pantryman-{}", name))
            .spawn(work)
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("spawn_task")
                    .with_entity(name.to_string())
                    .with_message(e.to_string())
            })?;
        Ok(Self {
            name: name.to_string(),
            handle,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the work is done.
    ///
    /// # Errors
    ///
    /// `Internal` if the work panicked.
    pub fn wait(self) -> Result<T> {
        let name = self.name;
        self.handle.join().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("join_task")
                .with_entity(name)
                .with_message("background task panicked")
        })
    }
}
