//! Azure OpenAI deployment client authenticated with Azure AD bearer tokens.
//!
//! Request and response bodies are the OpenAI chat completion types; only the
//! URL layout (`/openai/deployments/{deployment}`, `api-version` query) and the
//! `Authorization: Bearer` header differ from the public API.

use std::sync::Arc;
use std::time::Instant;

use async_openai::types::CreateChatCompletionResponse;
use async_trait::async_trait;
use localguide_core::AgentError;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::backend::{ChatBackend, CompletionRequest, LlmResponse};
use crate::client::{build_request, extract_response, llm_err};
use crate::credential::TokenCredential;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pulls the human-readable message out of an Azure error body.
fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => format!("Azure OpenAI API error {}: {}", status, body),
    }
}

/// Client for a single Azure OpenAI deployment.
pub struct AzureAdClient {
    http: Client,
    endpoint: String,
    deployment: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
}

impl AzureAdClient {
    /// Creates a client for `deployment` on the resource at `endpoint`.
    pub fn new(
        endpoint: &str,
        deployment: &str,
        api_version: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment: deployment.to_string(),
            api_version: api_version.to_string(),
            credential,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }
}

#[async_trait]
impl ChatBackend for AzureAdClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();
        let token = self.credential.token().await?;
        let body = build_request(&self.deployment, request)?;

        debug!("POST {} (api-version {})", self.completions_url(), self.api_version);

        let response = self
            .http
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(llm_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalApi(api_error_message(status, &body)));
        }

        let parsed: CreateChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ParseError(format!("Invalid completion response: {}", e)))?;

        extract_response(parsed, start.elapsed().as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticToken;

    #[async_trait]
    impl TokenCredential for StaticToken {
        async fn token(&self) -> Result<String, AgentError> {
            Ok("aad-token".into())
        }
    }

    struct FailingToken;

    #[async_trait]
    impl TokenCredential for FailingToken {
        async fn token(&self) -> Result<String, AgentError> {
            Err(AgentError::Auth("no identity".into()))
        }
    }

    const DEPLOYMENT_PATH: &str = "/openai/deployments/gpt-4o-mini/chat/completions";

    fn client(server: &MockServer, credential: Arc<dyn TokenCredential>) -> AzureAdClient {
        AzureAdClient::new(&format!("{}/", server.uri()), "gpt-4o-mini", "2024-06-01", credential)
    }

    #[tokio::test]
    async fn sends_bearer_token_to_deployment_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEPLOYMENT_PATH))
            .and(query_param("api-version", "2024-06-01"))
            .and(header("authorization", "Bearer aad-token"))
            .and(body_partial_json(json!({ "response_format": { "type": "json_object" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1_700_000_000u32,
                "model": "gpt-4o-mini",
                "prompt_filter_results": [],
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "{\"city\":\"Oslo\",\"attractions\":[]}" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, Arc::new(StaticToken))
            .complete(&CompletionRequest::json("system", "Oslo"))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"city\":\"Oslo\",\"attractions\":[]}");
        assert_eq!(response.metrics.input_tokens, 5);
        assert_eq!(response.metrics.output_tokens, 7);
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEPLOYMENT_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "code": "429", "message": "Rate limit is exceeded." }
            })))
            .mount(&server)
            .await;

        let err = client(&server, Arc::new(StaticToken))
            .complete(&CompletionRequest::text("system", "Oslo"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "External API error: Rate limit is exceeded.");
    }

    #[tokio::test]
    async fn credential_failure_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, Arc::new(FailingToken))
            .complete(&CompletionRequest::text("system", "Oslo"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Auth(_)));
    }

    #[test]
    fn non_json_error_body_keeps_status() {
        let message = api_error_message(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(message, "Azure OpenAI API error 502 Bad Gateway: upstream down");
    }
}
