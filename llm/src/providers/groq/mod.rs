mod api;
mod provider;

pub use provider::{GroqProvider, GroqSettings};
