pub(crate) mod gemini;
pub(crate) mod groq;

pub use gemini::{GeminiCallConfig, GeminiProvider, GeminiSettings};
pub use groq::{GroqProvider, GroqSettings};
