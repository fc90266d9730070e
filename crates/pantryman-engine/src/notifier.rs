//! Directory-change signal between the switch flow and the engine owner
//!
//! A single mailbox slot: publishing overwrites whatever is pending, and
//! taking empties it. The owner only ever sees the newest root, and sees
//! it once.

use pantryman_core::model::StorageRoot;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The active root was switched; `path` is the directory it resolved to
    /// at commit time.
    DirectoryChanged { root: StorageRoot, path: PathBuf },
}

type Slot = Arc<Mutex<Option<ChangeEvent>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<ChangeEvent>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Factory for connected publisher/receiver pairs
pub struct ChangeNotifier;

impl ChangeNotifier {
    pub fn channel() -> (ChangePublisher, ChangeReceiver) {
        let slot: Slot = Arc::new(Mutex::new(None));
        (
            ChangePublisher { slot: slot.clone() },
            ChangeReceiver { slot },
        )
    }
}

/// Sending side; cheap to clone
#[derive(Debug, Clone)]
pub struct ChangePublisher {
    slot: Slot,
}

impl ChangePublisher {
    /// Store `event` for the receiver. Returns true when it replaced an
    /// event that had not been taken yet.
    pub fn publish(&self, event: ChangeEvent) -> bool {
        let superseded = lock(&self.slot).replace(event).is_some();
        if superseded {
            tracing::debug!("Pending directory change superseded");
        }
        superseded
    }
}

/// Receiving side, held by the engine owner
#[derive(Debug)]
pub struct ChangeReceiver {
    slot: Slot,
}

impl ChangeReceiver {
    /// Take the pending event, leaving the slot empty
    pub fn take(&self) -> Option<ChangeEvent> {
        lock(&self.slot).take()
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.slot).is_some()
    }
}
