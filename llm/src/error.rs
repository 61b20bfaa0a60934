/// A per-call provider configuration that cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("model id is empty")]
    EmptyModel,

    #[error("thinking budget {budget} is outside 1..={max}")]
    ThinkingBudgetOutOfRange { budget: u32, max: u32 },

    #[error("search grounding cannot be combined with an image")]
    GroundingWithImage,

    #[error("{provider} does not accept images")]
    ImagesUnsupported { provider: String },
}
