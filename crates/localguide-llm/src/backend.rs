//! The request/response contract shared by every chat backend.

use async_trait::async_trait;
use localguide_core::AgentError;

/// Requested shape of the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object (JSON mode).
    Json,
}

/// A single system + user chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_input: String,
    pub format: OutputFormat,
}

impl CompletionRequest {
    pub fn text(system_prompt: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_input: user_input.into(),
            format: OutputFormat::Text,
        }
    }

    pub fn json(system_prompt: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            format: OutputFormat::Json,
            ..Self::text(system_prompt, user_input)
        }
    }
}

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// Complete response from an LLM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub content: String,
    pub metrics: LlmMetrics,
}

impl LlmResponse {
    /// Response with zeroed metrics, mostly for test doubles.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self { content: content.into(), metrics: LlmMetrics::default() }
    }
}

/// A chat-completion backend.
///
/// Implementations are shared across concurrent requests and must not keep
/// per-request state.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, AgentError>;
}
