//! Two-step attraction pipeline: structured extraction, then prose.

use std::sync::Arc;

use localguide_core::{AgentError, CityAttractions};
use localguide_llm::{Agent, ChatBackend};
use tracing::{info, instrument};

pub const GUIDE_SYSTEM_PROMPT: &str =
    "You are an expert local guide. Provide detailed information about attractions in the specified city.";

/// Builds the prose request from the extracted attractions.
///
/// The city and the JSON rendering of the attraction list are interpolated
/// unchanged.
pub fn prose_prompt(result: &CityAttractions) -> Result<String, AgentError> {
    let attractions = serde_json::to_string(&result.attractions)?;
    Ok(format!(
        "Please provide a detailed list of attractions in {} with the following details:\n{}",
        result.city, attractions
    ))
}

/// Turns a free-text city query into a prose description of its attractions.
#[derive(Clone)]
pub struct AttractionGuide {
    agent: Agent,
}

impl AttractionGuide {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { agent: Agent::new(backend, GUIDE_SYSTEM_PROMPT) }
    }

    /// Runs the extraction call, then the prose call built from its result.
    ///
    /// The query is forwarded verbatim, empty or not. Either call failing
    /// fails the whole operation.
    #[instrument(name = "guide.describe", skip_all, fields(query_len = query.len()))]
    pub async fn describe(&self, query: &str) -> Result<String, AgentError> {
        let structured: CityAttractions = self.agent.run_structured(query).await?;
        info!(
            "Resolved city '{}' with {} attractions",
            structured.city,
            structured.attractions.len()
        );

        let prompt = prose_prompt(&structured)?;
        self.agent.run_text(&prompt).await
    }
}
