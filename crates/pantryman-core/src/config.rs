//! Application configuration

use crate::logging_facility::Profile;
use std::path::{Path, PathBuf};

/// Preference key holding the active storage root
pub const PREF_DATA_DIR: &str = "data_directory";
/// Default storage directory name under the app dir
pub const DEFAULT_DIR_NAME: &str = "cookbook_data";
pub const PREFERENCES_FILE: &str = "preferences.yaml";
pub const GRANTS_FILE: &str = "grants.yaml";

/// Resolved application configuration
///
/// Everything the store and engine crates need to find their files lives
/// under `app_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_dir: PathBuf,
    pub default_dir_name: String,
    pub preferences_file: String,
    pub grants_file: String,
    pub log_profile: Profile,
}

impl AppConfig {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            default_dir_name: DEFAULT_DIR_NAME.to_string(),
            preferences_file: PREFERENCES_FILE.to_string(),
            grants_file: GRANTS_FILE.to_string(),
            log_profile: Profile::default(),
        }
    }

    pub fn with_log_profile(mut self, profile: Profile) -> Self {
        self.log_profile = profile;
        self
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Local root used when nothing is persisted or a grant was lost
    pub fn default_root_path(&self) -> PathBuf {
        self.app_dir.join(&self.default_dir_name)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.app_dir.join(&self.preferences_file)
    }

    pub fn grants_path(&self) -> PathBuf {
        self.app_dir.join(&self.grants_file)
    }
}
