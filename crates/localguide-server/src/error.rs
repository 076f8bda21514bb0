//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use localguide_core::AgentError;
use serde::{Deserialize, Serialize};

/// Application-level errors with HTTP status code mapping.
///
/// Every failure of the attraction pipeline is an upstream/processing
/// failure; the caller sees its message verbatim.
#[derive(Debug)]
pub enum AppError {
    Internal(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
