//! Selects the chat backend from the service configuration.

use std::sync::Arc;

use localguide_config::{ProviderConfig, ServiceConfig, COGNITIVE_SERVICES_RESOURCE};
use tracing::info;

use crate::azure::AzureAdClient;
use crate::backend::ChatBackend;
use crate::client::LlmClient;
use crate::credential::{IdentitySource, ManagedIdentityCredential};

/// Builds the process-wide backend for `config`.
///
/// - `api_key` → [`LlmClient`] against OpenAI or `OPENAI_BASE_URL`
/// - `managed_identity` → [`AzureAdClient`] with a [`ManagedIdentityCredential`]
///   whose token source is detected from the environment
pub fn backend_for(config: &ServiceConfig) -> Arc<dyn ChatBackend> {
    build_backend(config, IdentitySource::from_env)
}

/// `identity` is only consulted for the managed-identity provider.
fn build_backend(
    config: &ServiceConfig,
    identity: impl FnOnce() -> IdentitySource,
) -> Arc<dyn ChatBackend> {
    match &config.provider {
        ProviderConfig::OpenAi { api_key, api_base } => {
            info!(
                "Using OpenAI-compatible backend: model={}, api_base={}",
                config.model,
                api_base.as_deref().unwrap_or("default")
            );
            Arc::new(LlmClient::new(&config.model, api_key, api_base.as_deref()))
        }
        ProviderConfig::AzureManagedIdentity { endpoint, api_version, client_id } => {
            info!(
                "Using Azure OpenAI backend: endpoint={}, deployment={}, api_version={}",
                endpoint, config.model, api_version
            );
            let source = identity();
            info!("Managed identity source: {}", source.kind());
            let credential =
                ManagedIdentityCredential::new(source, COGNITIVE_SERVICES_RESOURCE, client_id.as_deref());
            Arc::new(AzureAdClient::new(endpoint, &config.model, api_version, Arc::new(credential)))
        }
    }
}
