use super::api::{ChatCompletionRequest, ChatCompletionResponse};
use crate::client::Client;
use crate::error::ConfigError;
use crate::traffic_log;
use crate::{Capabilities, GenerateRequest, GenerateResult, Provider};
use async_trait::async_trait;
use config::ProviderConfig;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const API_VERSION: &str = "v1";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroqSettings {
    pub model: String,
    pub max_tokens: Option<u32>,
}

impl Default for GroqSettings {
    fn default() -> Self {
        GroqSettings {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
        }
    }
}

impl From<&config::ProviderSettings> for GroqSettings {
    fn from(settings: &config::ProviderSettings) -> Self {
        GroqSettings {
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: settings.max_output_tokens,
        }
    }
}

/// Text-only backup provider speaking the OpenAI chat completions dialect.
pub struct GroqProvider {
    client: Option<Client>,
    base_url: String,
    system_instruction: String,
    settings: GroqSettings,
}

impl GroqProvider {
    pub fn new(config: &ProviderConfig, system_instruction: impl Into<String>) -> anyhow::Result<Self> {
        let client = match &config.api_key {
            Some(api_key) => {
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(
                    AUTHORIZATION,
                    HeaderValue::from_str(&format!("Bearer {}", api_key))?,
                );
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

        Ok(GroqProvider {
            client,
            base_url: format!("{}/{}", base_url, API_VERSION),
            system_instruction: system_instruction.into(),
            settings: GroqSettings::from(&config.settings),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Provider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::text_only()
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResult> {
        if request.has_image() {
            return Err(ConfigError::ImagesUnsupported {
                provider: self.name().to_string(),
            }
            .into());
        }
        let Some(client) = &self.client else {
            tracing::error!("Groq API key not configured");
            return Ok(GenerateResult::configuration_error());
        };
        if self.settings.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        let model = &self.settings.model;
        tracing::debug!(model = %model, "Calling Groq");

        let api_request = ChatCompletionRequest::build(
            model,
            &self.system_instruction,
            self.settings.max_tokens,
            request,
        );
        traffic_log::log_request(model, &api_request);

        match client
            .post::<_, _, ChatCompletionResponse>(self.chat_url(), &api_request)
            .await
        {
            Ok(response) => {
                traffic_log::log_response(model, &response);
                Ok(response.into())
            }
            Err(e) => {
                traffic_log::log_error(model, &e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ImageData, Mode};

    #[tokio::test]
    async fn test_images_are_rejected_before_anything_else() {
        let provider = GroqProvider::new(&ProviderConfig::default(), "").unwrap();
        let request = GenerateRequest::new("oi", Mode::Standard)
            .with_image(ImageData::new("data:image/png;base64,AA=="));
        let err = provider.generate(&request).await.unwrap_err();
        assert!(err.to_string().contains("does not accept images"));
    }

    #[tokio::test]
    async fn test_missing_key_returns_configuration_error() {
        let provider = GroqProvider::new(&ProviderConfig::default(), "").unwrap();
        let result = provider
            .generate(&GenerateRequest::new("oi", Mode::Standard))
            .await
            .unwrap();
        assert_eq!(result, GenerateResult::configuration_error());
    }

    #[test]
    fn test_defaults_and_url() {
        let provider = GroqProvider::new(&ProviderConfig::default(), "").unwrap();
        assert_eq!(provider.settings.model, DEFAULT_MODEL);
        assert_eq!(
            provider.chat_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(provider.capabilities(), Capabilities::text_only());
    }
}
