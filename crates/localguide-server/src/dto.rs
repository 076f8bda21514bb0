//! Data transfer objects for HTTP serialization.

use serde::{Deserialize, Serialize};

/// Fixed body returned by the liveness probe.
pub const LIVENESS_MESSAGE: &str = "FastAPI is running";

/// Response from `GET /`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LivenessResponse {
    pub message: String,
}

impl Default for LivenessResponse {
    fn default() -> Self {
        Self { message: LIVENESS_MESSAGE.to_string() }
    }
}

/// Query string of `POST /attractions`.
///
/// A missing `query` is the empty string; it is forwarded to the model as is.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AttractionsQuery {
    pub query: String,
}

impl AttractionsQuery {
    /// Builds the query from raw query-string pairs; a repeated `query` keeps its last value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let query = pairs
            .into_iter()
            .filter(|(key, _)| key == "query")
            .last()
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { query }
    }
}
