//! A system prompt bound to a backend, with text and structured runs.

use std::sync::Arc;

use localguide_core::AgentError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{ChatBackend, CompletionRequest};

/// Runs prompts against a [`ChatBackend`] under a fixed system prompt.
///
/// Cheap to clone; the backend is shared.
#[derive(Clone)]
pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    system_prompt: String,
}

impl Agent {
    pub fn new(backend: Arc<dyn ChatBackend>, system_prompt: impl Into<String>) -> Self {
        Self { backend, system_prompt: system_prompt.into() }
    }

    /// Sends `prompt` and returns the model's free-form reply.
    pub async fn run_text(&self, prompt: &str) -> Result<String, AgentError> {
        let request = CompletionRequest::text(self.system_prompt.as_str(), prompt);
        Ok(self.backend.complete(&request).await?.content)
    }

    /// Sends `prompt` in JSON mode with the schema of `T` attached, then parses the reply.
    ///
    /// The model is asked, not forced, to follow the schema: replies that do not
    /// deserialize into `T` are a [`AgentError::ParseError`].
    pub async fn run_structured<T>(&self, prompt: &str) -> Result<T, AgentError>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let request = CompletionRequest::json(structured_system_prompt::<T>(&self.system_prompt)?, prompt);
        let response = self.backend.complete(&request).await?;

        debug!("Structured response: {}", response.content);

        serde_json::from_str(strip_code_fence(&response.content)).map_err(|e| {
            AgentError::ParseError(format!("Failed to parse: {} - content: {}", e, response.content))
        })
    }
}

/// Appends the JSON schema of `T` to the base system prompt.
fn structured_system_prompt<T: JsonSchema>(base: &str) -> Result<String, AgentError> {
    let schema = serde_json::to_string(&schemars::schema_for!(T))?;
    Ok(format!(
        "{}\n\nRespond with a single JSON object that conforms to this JSON schema:\n{}",
        base, schema
    ))
}

/// Returns the contents of the first markdown code fence, if any.
///
/// Text before the opening fence or after the closing one is ignored.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let inner = &trimmed[start + 3..];
    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    // Drop an info string such as `json` on the opening line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
