//! Service configuration for localguide.
//!
//! All settings come from environment variables (a `.env` file is loaded by
//! the server binary before this runs):
//!
//! - [`ServiceConfig`] — Complete runtime configuration
//! - [`ProviderConfig`] — How to reach and authenticate with the model backend
//! - [`TelemetryConfig`] — Optional OTLP trace export
//! - [`AuthMode`] — `api_key` or `managed_identity`
//!
//! # Example
//!
//! ```rust
//! use localguide_config::{AuthMode, ServiceConfig};
//!
//! let config = ServiceConfig::from_lookup(|key| match key {
//!     "OPENAI_API_KEY" => Some("sk-test".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert_eq!(config.model, "gpt-4o-mini");
//! assert_eq!(config.auth_mode(), AuthMode::ApiKey);
//! assert_eq!(config.port, 8000);
//! ```

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";
pub const DEFAULT_SERVICE_NAME: &str = "localguide";

/// Token audience for Azure OpenAI (Cognitive Services).
pub const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Errors that can occur when reading configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set (or is empty).
    #[error("Missing required environment variable '{0}'")]
    Missing(String),

    /// A variable is set but its value cannot be used.
    #[error("Invalid value '{value}' for '{var}': {message}")]
    Invalid {
        var: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// How requests to the model backend are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Static API key against an OpenAI-compatible endpoint.
    ApiKey,
    /// Azure AD bearer tokens from the host's managed identity.
    ManagedIdentity,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "api_key" | "apikey" | "key" => Ok(Self::ApiKey),
            "managed_identity" | "azure_ad" | "entra" => Ok(Self::ManagedIdentity),
            other => Err(format!("unknown auth mode '{}'", other)),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey => f.write_str("api_key"),
            Self::ManagedIdentity => f.write_str("managed_identity"),
        }
    }
}

/// Connection details for the model backend.
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// OpenAI, or any OpenAI-compatible endpoint when `api_base` is set.
    OpenAi {
        api_key: String,
        api_base: Option<String>,
    },
    /// Azure OpenAI deployment authenticated with a managed identity.
    AzureManagedIdentity {
        endpoint: String,
        api_version: String,
        /// User-assigned identity; `None` selects the system-assigned one.
        client_id: Option<String>,
    },
}

impl ProviderConfig {
    pub fn auth_mode(&self) -> AuthMode {
        match self {
            Self::OpenAi { .. } => AuthMode::ApiKey,
            Self::AzureManagedIdentity { .. } => AuthMode::ManagedIdentity,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi { api_base, .. } => f
                .debug_struct("OpenAi")
                .field("api_key", &"<redacted>")
                .field("api_base", api_base)
                .finish(),
            Self::AzureManagedIdentity { endpoint, api_version, client_id } => f
                .debug_struct("AzureManagedIdentity")
                .field("endpoint", endpoint)
                .field("api_version", api_version)
                .field("client_id", client_id)
                .finish(),
        }
    }
}

/// OTLP trace export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub otlp_endpoint: String,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

/// Complete runtime configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Model name; on Azure this is the deployment name.
    pub model: String,
    pub provider: ProviderConfig,
    pub telemetry: TelemetryConfig,
    pub port: u16,
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let model = get("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let auth_mode = match get("AUTH_MODE") {
            Some(raw) => raw
                .parse::<AuthMode>()
                .map_err(|e| ConfigError::invalid("AUTH_MODE", &raw, e))?,
            None => AuthMode::ApiKey,
        };

        let provider = match auth_mode {
            AuthMode::ApiKey => ProviderConfig::OpenAi {
                api_key: require("OPENAI_API_KEY")?,
                api_base: get("OPENAI_BASE_URL"),
            },
            AuthMode::ManagedIdentity => ProviderConfig::AzureManagedIdentity {
                endpoint: require("AZURE_OPENAI_ENDPOINT")?
                    .trim_end_matches('/')
                    .to_string(),
                api_version: get("AZURE_OPENAI_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
                client_id: get("AZURE_CLIENT_ID"),
            },
        };

        let enabled = match get("TRACING_ENABLED") {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid("TRACING_ENABLED", &raw, "expected a boolean"))?,
            None => false,
        };

        let telemetry = TelemetryConfig {
            enabled,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_OTLP_ENDPOINT.to_string()),
            service_name: get("OTEL_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", &raw, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { model, provider, telemetry, port })
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.provider.auth_mode()
    }

    /// Listen address; the host is always all interfaces.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
