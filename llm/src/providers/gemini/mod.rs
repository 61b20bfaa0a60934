mod api;
mod provider;

pub use provider::{GeminiCallConfig, GeminiProvider, GeminiSettings};
