use llm::{GenerateRequest, GenerateResult, Mode, Provider};
use std::sync::Arc;

/// Prepended to answers that came from the backup provider.
pub const BACKUP_MARKER: &str = "(Resposta via Groq ⚡)\n\n";

/// Returned when no provider could answer.
pub const CRITICAL_FAILURE_TEXT: &str = "Ocorreu um erro crítico. Ambos os serviços de IA (Gemini e Groq) falharam. Por favor, tenta novamente mais tarde.";

/// Which path produced a routed answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    Primary,
    Secondary,
    Failed,
}

/// Chooses a provider for each request and falls back to the secondary one
/// for plain text in standard mode. Never returns an error.
#[derive(Clone)]
pub struct Router {
    primary: Arc<dyn Provider>,
    secondary: Arc<dyn Provider>,
}

impl Router {
    pub fn new(primary: Arc<dyn Provider>, secondary: Arc<dyn Provider>) -> Self {
        Router { primary, secondary }
    }

    pub async fn route(&self, request: &GenerateRequest) -> GenerateResult {
        self.route_with_outcome(request).await.0
    }

    pub async fn route_with_outcome(
        &self,
        request: &GenerateRequest,
    ) -> (GenerateResult, RouteOutcome) {
        if request.mode == Mode::Elevated {
            tracing::info!(provider = self.primary.name(), "Routing: elevated mode, primary only");
            return self.primary_only(request).await;
        }

        if request.has_image() {
            tracing::info!(provider = self.primary.name(), "Routing: image attached, primary only");
            return self.primary_only(request).await;
        }

        tracing::info!(provider = self.primary.name(), "Routing: text request, trying primary");
        let primary_error = match self.primary.generate(request).await {
            Ok(result) => return (result, RouteOutcome::Primary),
            Err(e) => e,
        };
        tracing::error!(provider = self.primary.name(), "Primary provider failed: {:#}", primary_error);

        if !self.secondary.capabilities().accepts(request) {
            tracing::error!(provider = self.secondary.name(), "Backup provider cannot take this request");
            return (GenerateResult::text(CRITICAL_FAILURE_TEXT), RouteOutcome::Failed);
        }

        tracing::warn!(provider = self.secondary.name(), "Failover: trying backup provider");
        match self.secondary.generate(request).await {
            Ok(result) => {
                let text = format!("{}{}", BACKUP_MARKER, result.text);
                (GenerateResult { text, ..result }, RouteOutcome::Secondary)
            }
            Err(e) => {
                tracing::error!(provider = self.secondary.name(), "Backup provider failed: {:#}", e);
                (GenerateResult::text(CRITICAL_FAILURE_TEXT), RouteOutcome::Failed)
            }
        }
    }

    async fn primary_only(&self, request: &GenerateRequest) -> (GenerateResult, RouteOutcome) {
        match self.primary.generate(request).await {
            Ok(result) => (result, RouteOutcome::Primary),
            Err(e) => {
                tracing::error!(provider = self.primary.name(), "Primary provider failed, no failover for this request: {:#}", e);
                (GenerateResult::text(CRITICAL_FAILURE_TEXT), RouteOutcome::Failed)
            }
        }
    }
}
