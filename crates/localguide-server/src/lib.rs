//! Axum router and shared state for the localguide attraction service.
//!
//! Routes:
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/` | `{"message": "FastAPI is running"}` |
//! | `GET` | `/health` | `OK` |
//! | `POST` | `/attractions?query=…` | prose description, or 500 `{"detail": …}` |

pub mod dto;
pub mod error;
pub mod handlers;
pub mod services;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::guide::AttractionGuide;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub guide: AttractionGuide,
}

impl ServerState {
    pub fn new(guide: AttractionGuide) -> Self {
        Self { guide }
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/attractions", post(handlers::attractions::attractions))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
