use async_trait::async_trait;
use std::sync::Arc;

pub mod api;
mod client;
mod error;
pub mod providers;
pub mod traffic_log;
pub mod transcript;

pub use api::*;
pub use error::ConfigError;
pub use providers::{GeminiProvider, GroqProvider};

/// What a provider can accept beyond plain text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_images: bool,
    pub supports_grounding: bool,
}

impl Capabilities {
    pub fn text_only() -> Self {
        Self::default()
    }

    /// Whether a request can be sent to a provider with these capabilities
    pub fn accepts(&self, request: &GenerateRequest) -> bool {
        self.supports_images || !request.has_image()
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Errors cover transport failures, non-success statuses and bodies that
    /// do not decode. Empty answers are not errors.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResult>;
}

#[async_trait]
impl Provider for Arc<dyn Provider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResult> {
        (**self).generate(request).await
    }
}
