//! Router tests for the attraction service, driven through `tower::ServiceExt`
//! with in-process fake backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use localguide_core::AgentError;
use localguide_llm::{ChatBackend, CompletionRequest, LlmResponse, OutputFormat};
use localguide_server::error::ErrorResponse;
use localguide_server::services::guide::AttractionGuide;
use localguide_server::{build_router, ServerState};
use serde_json::json;
use tower::util::ServiceExt;

/// Resolves the city to the raw query and echoes the prose prompt back.
#[derive(Default)]
struct EchoBackend {
    seen: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, AgentError> {
        self.seen.lock().unwrap().push(request.clone());
        // Let concurrent requests interleave.
        tokio::task::yield_now().await;

        let content = match request.format {
            OutputFormat::Json => json!({
                "city": request.user_input,
                "attractions": [{
                    "name": format!("{} Museum", request.user_input),
                    "description": "Local history",
                    "address": "1 Main St",
                    "rating": 4.5,
                    "operating_hours": "09:00-17:00"
                }]
            })
            .to_string(),
            OutputFormat::Text => format!("Guide: {}", request.user_input),
        };
        Ok(LlmResponse::from_content(content))
    }
}

struct FailingBackend;

#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<LlmResponse, AgentError> {
        Err(AgentError::LlmError("backend unavailable".into()))
    }
}

fn app(backend: Arc<dyn ChatBackend>) -> Router {
    build_router(Arc::new(ServerState::new(AttractionGuide::new(backend))))
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn root_reports_liveness_without_backend() {
    let response = app(Arc::new(FailingBackend))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({ "message": "FastAPI is running" }));
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app(Arc::new(FailingBackend))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn attractions_returns_prose_as_text() {
    let backend = Arc::new(EchoBackend::default());
    let response = app(backend.clone()).oneshot(post("/attractions?query=Paris")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let text = body_text(response).await;
    assert!(!text.is_empty());
    assert!(text.starts_with("Guide: Please provide a detailed list of attractions in Paris"));
    assert!(text.contains("Paris Museum"));

    let seen = backend.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].format, OutputFormat::Json);
    assert_eq!(seen[0].user_input, "Paris");
    assert_eq!(seen[1].format, OutputFormat::Text);
}

#[tokio::test]
async fn backend_failure_becomes_500_with_detail() {
    let response = app(Arc::new(FailingBackend))
        .oneshot(post("/attractions?query=Paris"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body.detail,
        AgentError::LlmError("backend unavailable".into()).to_string()
    );
}

#[tokio::test]
async fn missing_query_is_forwarded_as_empty_prompt() {
    let backend = Arc::new(EchoBackend::default());
    let response = app(backend.clone()).oneshot(post("/attractions")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.seen.lock().unwrap()[0].user_input, "");
}

#[tokio::test]
async fn repeated_query_uses_last_value() {
    let backend = Arc::new(EchoBackend::default());
    let response = app(backend.clone())
        .oneshot(post("/attractions?query=Paris&query=Lyon"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.seen.lock().unwrap()[0].user_input, "Lyon");
}

#[tokio::test]
async fn multibyte_query_is_accepted() {
    let city = "é".repeat(60);
    let backend = Arc::new(EchoBackend::default());
    let response = app(backend.clone())
        .oneshot(post(&format!("/attractions?query={}", "%C3%A9".repeat(60))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.seen.lock().unwrap()[0].user_input, city);
}

#[tokio::test]
async fn concurrent_requests_stay_isolated() {
    let router = app(Arc::new(EchoBackend::default()));

    let (lisbon, new_york) = tokio::join!(
        router.clone().oneshot(post("/attractions?query=Lisbon")),
        router.clone().oneshot(post("/attractions?query=New%20York")),
    );

    let lisbon = body_text(lisbon.unwrap()).await;
    let new_york = body_text(new_york.unwrap()).await;

    assert!(lisbon.contains("attractions in Lisbon"));
    assert!(!lisbon.contains("New York"));
    assert!(new_york.contains("attractions in New York"));
    assert!(!new_york.contains("Lisbon"));
}
