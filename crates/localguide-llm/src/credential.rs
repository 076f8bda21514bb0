//! Azure AD bearer tokens from a managed identity.
//!
//! Two token sources are supported: the App Service / Container Apps
//! identity endpoint (`IDENTITY_ENDPOINT` + `IDENTITY_HEADER`), and the
//! Azure Instance Metadata Service everywhere else. Tokens are cached until
//! shortly before they expire.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use localguide_core::AgentError;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

const IMDS_TOKEN_URL: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: u64 = 300;

/// Supplies bearer tokens for outbound requests.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn token(&self) -> Result<String, AgentError>;
}

/// A bearer token and its expiry as seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: u64,
}

impl AccessToken {
    fn is_fresh(&self, now: u64) -> bool {
        self.expires_on > now.saturating_add(REFRESH_MARGIN_SECS)
    }
}

/// Where managed-identity tokens are requested from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// App Service / Container Apps local identity endpoint.
    AppService { endpoint: String, secret: String },
    /// Azure Instance Metadata Service.
    Imds { endpoint: String },
}

impl IdentitySource {
    /// Picks the App Service endpoint when its variables are set, IMDS otherwise.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("IDENTITY_ENDPOINT").ok().filter(|v| !v.is_empty());
        let secret = std::env::var("IDENTITY_HEADER").ok().filter(|v| !v.is_empty());

        match (endpoint, secret) {
            (Some(endpoint), Some(secret)) => Self::AppService { endpoint, secret },
            _ => Self::Imds { endpoint: IMDS_TOKEN_URL.to_string() },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::AppService { .. } => "app_service",
            Self::Imds { .. } => "imds",
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_on: Epoch,
}

/// `expires_on` arrives as a string on most hosts and as a number on some.
#[derive(Deserialize)]
#[serde(untagged)]
enum Epoch {
    Number(u64),
    Text(String),
}

impl Epoch {
    fn seconds(&self) -> Result<u64, AgentError> {
        match self {
            Epoch::Number(n) => Ok(*n),
            Epoch::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| AgentError::Auth(format!("invalid expires_on '{}'", s))),
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Token credential backed by the host's managed identity.
pub struct ManagedIdentityCredential {
    http: Client,
    source: IdentitySource,
    resource: String,
    client_id: Option<String>,
    cached: Mutex<Option<AccessToken>>,
}

impl ManagedIdentityCredential {
    /// Creates a credential for `resource` (e.g. `https://cognitiveservices.azure.com`).
    ///
    /// `client_id` selects a user-assigned identity.
    pub fn new(source: IdentitySource, resource: &str, client_id: Option<&str>) -> Self {
        Self {
            http: Client::new(),
            source,
            resource: resource.trim_end_matches("/.default").to_string(),
            client_id: client_id.map(String::from),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<AccessToken, AgentError> {
        let mut query = vec![("resource", self.resource.as_str())];

        let request = match &self.source {
            IdentitySource::AppService { endpoint, secret } => {
                query.push(("api-version", APP_SERVICE_API_VERSION));
                self.http.get(endpoint).header("X-IDENTITY-HEADER", secret)
            }
            IdentitySource::Imds { endpoint } => {
                query.push(("api-version", IMDS_API_VERSION));
                self.http.get(endpoint).header("Metadata", "true")
            }
        };

        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }

        let response = request
            .query(&query)
            .send()
            .await
            .map_err(|e| AgentError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Auth(format!(
                "managed identity endpoint returned {}: {}",
                status, body
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Auth(format!("invalid token response: {}", e)))?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_on: parsed.expires_on.seconds()?,
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn token(&self) -> Result<String, AgentError> {
        // Held across the fetch so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now_secs())) {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch().await?;
        debug!("Acquired managed identity token, expires_on={}", fresh.expires_on);

        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
