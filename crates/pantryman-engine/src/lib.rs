//! Pantryman Engine - engine ownership and directory switching
//!
//! Provides:
//! - `EngineHandle`, the owned engine resource
//! - `Session`, which binds, rebinds and caches engine snapshots
//! - `ChangeNotifier`, the directory-changed mailbox
//! - `DirectorySwitchController`, the select/confirm/cancel switch flow
//! - `BackgroundTask`, for slow I/O off the caller's thread
//! - `PantryApp`, the wiring of all of the above from an `AppConfig`

pub mod app;
pub mod handle;
pub mod notifier;
pub mod session;
pub mod switch;
pub mod task;

pub use app::PantryApp;
pub use handle::EngineHandle;
pub use notifier::{ChangeEvent, ChangeNotifier, ChangePublisher, ChangeReceiver};
pub use session::{BindingState, Session};
pub use switch::{
    DirectorySwitchController, SwitchMode, SwitchOutcome, SwitchPlan, SwitchProposal, SwitchState,
};
pub use task::BackgroundTask;
