//! Application wiring
//!
//! Builds the preference store, grant registry, locator, switch controller
//! and session from one `AppConfig`, with the notifier connecting the
//! controller to the session.

use crate::notifier::{ChangeNotifier, ChangeReceiver};
use crate::session::Session;
use crate::switch::DirectorySwitchController;
use pantryman_core::config::AppConfig;
use pantryman_core::engine_api::EngineOpener;
use pantryman_store::dataset::YamlEngineOpener;
use pantryman_store::errors::Result;
use pantryman_store::grants::GrantRegistry;
use pantryman_store::locator::{ResolvedRoot, StorageLocator};
use pantryman_store::prefs::FilePreferences;
use std::sync::Arc;

pub struct PantryApp {
    config: AppConfig,
    grants: Arc<GrantRegistry>,
    locator: Arc<StorageLocator>,
    controller: DirectorySwitchController,
    session: Session,
    receiver: ChangeReceiver,
}

impl PantryApp {
    /// Wire the file-backed stores and the YAML engine
    pub fn new(config: AppConfig) -> Self {
        Self::with_opener(config, Arc::new(YamlEngineOpener))
    }

    pub fn with_opener(config: AppConfig, opener: Arc<dyn EngineOpener>) -> Self {
        let prefs = Arc::new(FilePreferences::new(config.preferences_path()));
        let grants = Arc::new(GrantRegistry::new(config.grants_path()));
        let locator = Arc::new(StorageLocator::from_config(
            &config,
            prefs,
            grants.clone(),
        ));
        let (publisher, receiver) = ChangeNotifier::channel();
        let controller = DirectorySwitchController::new(locator.clone(), publisher);
        Self {
            config,
            grants,
            locator,
            controller,
            session: Session::new(opener),
            receiver,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn grants(&self) -> &GrantRegistry {
        &self.grants
    }

    pub fn locator(&self) -> &StorageLocator {
        &self.locator
    }

    pub fn controller(&self) -> &DirectorySwitchController {
        &self.controller
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Resolve the active root and bind the session to it.
    ///
    /// A failed bind leaves the session in its `Failed` state; the resolved
    /// root is returned either way so the caller can report it.
    pub fn start(&mut self) -> ResolvedRoot {
        let resolved = self.locator.resolve_active_root();
        if let Some(warning) = &resolved.degradation {
            tracing::warn!(error = %warning, "Using fallback data directory");
        }
        if let Err(e) = self.session.bind_active(&resolved) {
            tracing::error!(error = %e, "Could not open the data directory");
        }
        resolved
    }

    /// Rebind if a switch was committed since the last resume
    pub fn resume(&mut self) -> Option<Result<()>> {
        self.session.on_resume(&self.receiver)
    }
}
