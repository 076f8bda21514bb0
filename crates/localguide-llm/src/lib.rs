//! LLM backends and the structured-output agent for localguide.
//!
//! - [`ChatBackend`] — Seam every backend (and test double) implements
//! - [`LlmClient`] — OpenAI-compatible client authenticated with an API key
//! - [`AzureAdClient`] — Azure OpenAI deployment authenticated with bearer tokens
//! - [`ManagedIdentityCredential`] — Azure AD tokens from the host's managed identity
//! - [`Agent`] — System prompt plus backend; runs text or structured requests
//! - [`backend_for`] — Builds the backend selected by [`ServiceConfig`](localguide_config::ServiceConfig)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use localguide_config::ServiceConfig;
//! use localguide_core::CityAttractions;
//! use localguide_llm::{backend_for, Agent};
//!
//! let config = ServiceConfig::from_env()?;
//! let agent = Agent::new(backend_for(&config), "You are an expert local guide.");
//!
//! let parsed: CityAttractions = agent.run_structured("Rome").await?;
//! let prose = agent.run_text(&format!("Describe {}", parsed.city)).await?;
//! ```

mod agent;
mod azure;
mod backend;
mod client;
mod credential;
mod unified;

pub use agent::Agent;
pub use azure::AzureAdClient;
pub use backend::{ChatBackend, CompletionRequest, LlmMetrics, LlmResponse, OutputFormat};
pub use client::LlmClient;
pub use credential::{AccessToken, IdentitySource, ManagedIdentityCredential, TokenCredential};
pub use unified::backend_for;
