use super::api::{GenerateContentRequest, GenerateContentResponse};
use crate::client::Client;
use crate::error::ConfigError;
use crate::traffic_log;
use crate::{Capabilities, GenerateRequest, GenerateResult, Mode, Provider};
use async_trait::async_trait;
use config::ProviderConfig;
use reqwest::header::{self, HeaderMap, HeaderValue};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

pub const FLASH_MODEL: &str = "gemini-2.5-flash";
pub const PRO_MODEL: &str = "gemini-2.5-pro";
pub const ELEVATED_THINKING_BUDGET: u32 = 32768;
const MAX_THINKING_BUDGET: u32 = 32768;

/// Model choices for the two modes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeminiSettings {
    pub standard_model: String,
    pub elevated_model: String,
    pub thinking_budget: u32,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        GeminiSettings {
            standard_model: FLASH_MODEL.to_string(),
            elevated_model: PRO_MODEL.to_string(),
            thinking_budget: ELEVATED_THINKING_BUDGET,
            max_output_tokens: None,
        }
    }
}

impl From<&config::ProviderSettings> for GeminiSettings {
    fn from(settings: &config::ProviderSettings) -> Self {
        let defaults = GeminiSettings::default();
        GeminiSettings {
            standard_model: settings.model.clone().unwrap_or(defaults.standard_model),
            elevated_model: settings
                .elevated_model
                .clone()
                .unwrap_or(defaults.elevated_model),
            thinking_budget: settings.thinking_budget.unwrap_or(defaults.thinking_budget),
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

/// Everything that varies between Gemini calls, resolved from the mode and
/// the shape of the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeminiCallConfig {
    pub model: String,
    pub thinking_budget: Option<u32>,
    pub google_search: bool,
    pub max_output_tokens: Option<u32>,
}

impl GeminiCallConfig {
    /// Elevated: reasoning model with a thinking budget, no search.
    /// Standard: fast model, search grounding unless an image is attached.
    pub fn for_request(settings: &GeminiSettings, request: &GenerateRequest) -> Self {
        match request.mode {
            Mode::Elevated => GeminiCallConfig {
                model: settings.elevated_model.clone(),
                thinking_budget: Some(settings.thinking_budget),
                google_search: false,
                max_output_tokens: settings.max_output_tokens,
            },
            Mode::Standard => GeminiCallConfig {
                model: settings.standard_model.clone(),
                thinking_budget: None,
                google_search: !request.has_image(),
                max_output_tokens: settings.max_output_tokens,
            },
        }
    }

    pub fn validate(&self, request: &GenerateRequest) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if let Some(budget) = self.thinking_budget {
            if budget == 0 || budget > MAX_THINKING_BUDGET {
                return Err(ConfigError::ThinkingBudgetOutOfRange {
                    budget,
                    max: MAX_THINKING_BUDGET,
                });
            }
        }
        if self.google_search && request.has_image() {
            return Err(ConfigError::GroundingWithImage);
        }
        Ok(())
    }
}

pub struct GeminiProvider {
    /// `None` when no API key is configured.
    client: Option<Client>,
    base_url: String,
    system_instruction: String,
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig, system_instruction: impl Into<String>) -> anyhow::Result<Self> {
        let client = match &config.api_key {
            Some(api_key) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert("x-goog-api-key", HeaderValue::from_str(api_key)?);
                Some(Client::with_headers(headers)?)
            }
            None => None,
        };

        let base_url = config
            .settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');

        Ok(GeminiProvider {
            client,
            base_url: format!("{}/{}", base_url, API_VERSION),
            system_instruction: system_instruction.into(),
            settings: GeminiSettings::from(&config.settings),
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_images: true,
            supports_grounding: true,
        }
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResult> {
        let Some(client) = &self.client else {
            tracing::error!("Gemini API key not configured");
            return Ok(GenerateResult::configuration_error());
        };

        let call = GeminiCallConfig::for_request(&self.settings, request);
        call.validate(request)?;
        tracing::debug!(
            model = %call.model,
            grounding = call.google_search,
            thinking_budget = ?call.thinking_budget,
            has_image = request.has_image(),
            "Calling Gemini"
        );

        let api_request = GenerateContentRequest::build(&self.system_instruction, &call, request);
        traffic_log::log_request(&call.model, &api_request);

        match client
            .post::<_, _, GenerateContentResponse>(self.generate_url(&call.model), &api_request)
            .await
        {
            Ok(response) => {
                traffic_log::log_response(&call.model, &response);
                Ok(response.into())
            }
            Err(e) => {
                traffic_log::log_error(&call.model, &e.to_string());
                Err(e)
            }
        }
    }
}
