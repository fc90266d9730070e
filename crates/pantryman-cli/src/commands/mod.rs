//! Subcommand implementations and the helpers they share

pub mod dir;
pub mod ingredients;
pub mod pantry;

use pantryman_core::config::AppConfig;
use pantryman_core::errors::ExError;
use pantryman_core::logging_facility::Profile;
use pantryman_engine::app::PantryApp;
use pantryman_engine::session::BindingState;
use std::error::Error;
use std::path::PathBuf;

pub type CliResult = Result<(), Box<dyn Error>>;

/// Build the app configuration from `--home` (or `$HOME/.pantryman`)
pub fn app_config(home: Option<PathBuf>, log_format: &str) -> Result<AppConfig, Box<dyn Error>> {
    let app_dir = match home {
        Some(dir) => dir,
        None => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".pantryman"))
            .ok_or("HOME is not set; pass --home or set PANTRYMAN_HOME")?,
    };
    Ok(AppConfig::new(app_dir).with_log_profile(Profile::parse(log_format)))
}

/// Start the app and require a bound engine
pub fn open_bound(config: AppConfig) -> Result<PantryApp, Box<dyn Error>> {
    let mut app = PantryApp::new(config);
    let resolved = app.start();
    if let Some(degradation) = &resolved.degradation {
        report(degradation);
    }
    let failure: Option<Box<dyn Error>> = match app.session().state() {
        BindingState::Bound { .. } => None,
        BindingState::Failed { error, .. } => Some(error.clone().into()),
        BindingState::Unbound => Some("no data directory is bound".into()),
    };
    match failure {
        None => Ok(app),
        Some(e) => Err(e),
    }
}

/// Print a degradation as a warning and anything else as an error
pub fn report(error: &ExError) {
    if error.kind().is_blocking() {
        eprintln!("Error: {}", error);
    } else {
        eprintln!("Warning: {}", error);
    }
}

/// Turn a `false` from the session into the error it recorded
pub fn check(app: &PantryApp, ok: bool) -> CliResult {
    if ok {
        return Ok(());
    }
    match app.session().last_error() {
        Some(e) => Err(e.clone().into()),
        None => Err("request failed".into()),
    }
}
