//! HTTP route handlers for the localguide server.

pub mod attractions;

use axum::Json;

use crate::dto::LivenessResponse;

/// Liveness probe; never touches the model backend.
pub async fn root() -> Json<LivenessResponse> {
    Json(LivenessResponse::default())
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
