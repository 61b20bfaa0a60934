use std::path::PathBuf;

const APP_DIR: &str = "maior";

/// Platform locations for settings and logs.
pub struct PathManager;

impl PathManager {
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR))
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    pub fn logs_dir() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("logs"))
    }

    pub fn log_file_path() -> Option<PathBuf> {
        Self::logs_dir().map(|d| d.join("maior.log"))
    }
}
