pub mod adapter;
pub mod anthropic;
pub mod client;

use async_trait::async_trait;

use crate::error::{FailureKind, GenerationError};

pub use adapter::GenerationAdapter;
pub use anthropic::AnthropicClient;
pub use client::LlmClient;

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
}

/// A hosted text-generation service. Responses are non-deterministic.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<LlmResponse, GenerationError>;

    fn model(&self) -> &str;
}

// Clients carry no request timeout of their own; GenerationAdapter enforces it.
fn send_error(provider: &str, err: reqwest::Error) -> GenerationError {
    let kind = if err.is_builder() {
        FailureKind::Malformed
    } else {
        FailureKind::Transport
    };
    GenerationError::unavailable(kind, format!("failed to send request to {}: {}", provider, err))
}
