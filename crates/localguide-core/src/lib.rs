//! Core domain types and error definitions for localguide.
//!
//! - [`AgentError`] — Error type for agent and LLM operations
//! - [`Attraction`] and [`CityAttractions`] — Shape requested from the model
//!   on the structured extraction call
//!
//! # Example
//!
//! ```rust
//! use localguide_core::{Attraction, CityAttractions};
//!
//! let result = CityAttractions {
//!     city: "Lisbon".to_string(),
//!     attractions: vec![Attraction {
//!         name: "Belém Tower".to_string(),
//!         description: "16th-century fortification".to_string(),
//!         address: "Av. Brasília, 1400-038 Lisboa".to_string(),
//!         rating: 4.6,
//!         operating_hours: "10:00-18:30".to_string(),
//!     }],
//! };
//!
//! assert_eq!(result.attractions.len(), 1);
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while running the agent against an LLM backend.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse structured output from LLM.
    #[error("Failed to parse structured output: {0}")]
    ParseError(String),

    /// Acquiring a bearer token for the backend failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// External API returned an error response.
    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// A single tourist attraction as described by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attraction {
    /// Display name of the attraction.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Street address.
    pub address: String,
    /// Visitor rating.
    pub rating: f64,
    /// Opening hours in free text.
    pub operating_hours: String,
}

/// Attractions extracted for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CityAttractions {
    /// The city the model resolved from the query.
    pub city: String,
    /// Attractions in model order.
    pub attractions: Vec<Attraction>,
}
