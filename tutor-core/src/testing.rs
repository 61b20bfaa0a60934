//! Scripted provider for router/session/engine tests.

use async_trait::async_trait;
use llm::{Capabilities, GenerateRequest, GenerateResult, Provider};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) struct ScriptedProvider {
    name: String,
    capabilities: Capabilities,
    reply: Option<GenerateResult>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    fn build(name: &str, reply: Option<GenerateResult>) -> Self {
        // Only the primary is multimodal in these tests.
        let capabilities = if name == "gemini" {
            Capabilities {
                supports_images: true,
                supports_grounding: true,
            }
        } else {
            Capabilities::text_only()
        };
        ScriptedProvider {
            name: name.to_string(),
            capabilities,
            reply,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answering(name: &str, reply: GenerateResult) -> Arc<Self> {
        Arc::new(Self::build(name, Some(reply)))
    }

    pub(crate) fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, None))
    }

    pub(crate) fn slow(name: &str, reply: GenerateResult, delay: Duration) -> Arc<Self> {
        let mut provider = Self::build(name, Some(reply));
        provider.delay = Some(delay);
        Arc::new(provider)
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResult> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(anyhow::anyhow!("{} is unavailable", self.name)),
        }
    }
}
