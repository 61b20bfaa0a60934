pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{ProviderSettings, Settings, SettingsError};

use std::fmt;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const GROQ_BASE_URL_ENV: &str = "GROQ_BASE_URL";

/// Load environment variables from .env files.
/// First loads from ~/.env (home directory), then from ./.env (project directory).
/// Project directory values take precedence over home directory values.
/// Call this before parsing CLI args to ensure env vars are available.
pub fn load_env_file() {
    if let Some(home) = dirs::home_dir() {
        let home_env_path = home.join(".env");
        dotenv::from_path(home_env_path).ok();
    }

    dotenv::dotenv().ok();
}

/// Credentials and overrides for one provider.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub settings: ProviderSettings,
}

impl ProviderConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings)
            .finish()
    }
}

/// Process-wide configuration, built once at startup and handed to each
/// provider constructor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub gemini: ProviderConfig,
    pub groq: ProviderConfig,
    pub start_elevated: bool,
}

impl AppConfig {
    /// Read credentials from the environment and overrides from settings.toml
    pub fn load() -> Self {
        Self::from_sources(Settings::load(), |key| std::env::var(key).ok())
    }

    /// Environment values win over settings.toml. Blank values count as unset.
    pub fn from_sources(settings: Settings, env: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut gemini = ProviderConfig {
            api_key: lookup(GEMINI_API_KEY_ENV),
            settings: settings.gemini,
        };
        if let Some(url) = lookup(GEMINI_BASE_URL_ENV) {
            gemini.settings.base_url = Some(url);
        }

        let mut groq = ProviderConfig {
            api_key: lookup(GROQ_API_KEY_ENV),
            settings: settings.groq,
        };
        if let Some(url) = lookup(GROQ_BASE_URL_ENV) {
            groq.settings.base_url = Some(url);
        }

        if !gemini.has_credentials() {
            tracing::warn!("{} is not set; primary provider is disabled", GEMINI_API_KEY_ENV);
        }
        if !groq.has_credentials() {
            tracing::warn!("{} is not set; backup provider is disabled", GROQ_API_KEY_ENV);
        }

        AppConfig {
            gemini,
            groq,
            start_elevated: settings.start_elevated,
        }
    }
}
