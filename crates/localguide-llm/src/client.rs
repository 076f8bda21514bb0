//! OpenAI-compatible chat client.
//!
//! Works with the OpenAI API and any compatible endpoint reachable with an
//! API key. Also hosts the request/response conversion shared with
//! [`AzureAdClient`](crate::AzureAdClient).

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use localguide_core::AgentError;
use tracing::info;

use crate::backend::{ChatBackend, CompletionRequest, LlmMetrics, LlmResponse, OutputFormat};

/// Converts any error into an AgentError::LlmError.
pub(crate) fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}

/// Builds the message list for a simple system + user request.
fn build_messages(
    system_prompt: &str,
    user_input: &str,
) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    Ok(vec![
        ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(llm_err)?,
        ),
        ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(llm_err)?,
        ),
    ])
}

/// Builds the chat completion request body for `model`.
pub(crate) fn build_request(
    model: &str,
    request: &CompletionRequest,
) -> Result<CreateChatCompletionRequest, AgentError> {
    let messages = build_messages(&request.system_prompt, &request.user_input)?;

    let mut request_builder = CreateChatCompletionRequestArgs::default();
    request_builder.model(model).messages(messages);

    if request.format == OutputFormat::Json {
        request_builder.response_format(ResponseFormat::JsonObject);
    }

    request_builder.build().map_err(llm_err)
}

/// Extracts content and metrics from a completion response.
pub(crate) fn extract_response(
    response: CreateChatCompletionResponse,
    elapsed_ms: u64,
) -> Result<LlmResponse, AgentError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::LlmError("No response content".into()))?;

    let (input_tokens, output_tokens) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    Ok(LlmResponse {
        content,
        metrics: LlmMetrics { input_tokens, output_tokens, elapsed_ms },
    })
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl LlmClient {
    /// Creates a client for `model`, authenticating with `api_key`.
    ///
    /// `api_base` overrides the default `https://api.openai.com/v1`.
    pub fn new(model: &str, api_key: &str, api_base: Option<&str>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let config = match api_base {
            Some(base) => config.with_api_base(base),
            None => config,
        };

        Self {
            client: Client::with_config(config),
            default_model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();
        let body = build_request(&self.default_model, request)?;

        let response = self.client.chat().create(body).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }
}
