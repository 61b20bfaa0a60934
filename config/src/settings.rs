//! Application settings management

use crate::PathManager;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Per-provider overrides stored in settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Base URL override (proxies, mock servers)
    pub base_url: Option<String>,
    /// Model used for standard requests
    pub model: Option<String>,
    /// Model used for elevated requests (Gemini only)
    pub elevated_model: Option<String>,
    /// Reasoning budget for elevated requests (Gemini only)
    pub thinking_budget: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

/// Application settings stored in settings.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub gemini: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,
    /// Start in elevated mode
    #[serde(default)]
    pub start_elevated: bool,
}

impl Settings {
    /// Load settings from the settings file, or return defaults if not found.
    /// A file that exists but does not parse is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = PathManager::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
