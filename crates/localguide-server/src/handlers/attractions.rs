//! Attraction description handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use tracing::{error, info};

use crate::dto::AttractionsQuery;
use crate::error::AppError;
use crate::ServerState;

const LOG_PREVIEW_CHARS: usize = 50;

/// Describes the attractions of the city named in `query`, as plain text.
pub async fn attractions(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<String, AppError> {
    let params = AttractionsQuery::from_pairs(pairs);
    info!("Attractions request: {}...", preview(&params.query, LOG_PREVIEW_CHARS));

    state.guide.describe(&params.query).await.map_err(|e| {
        error!("Attractions error: {}", e);
        AppError::from(e)
    })
}

/// First `max_chars` characters of `s`.
fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
