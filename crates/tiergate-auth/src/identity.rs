//! Identity provider access
//!
//! The identity provider owns users and their private metadata. This
//! module defines the lookup seam and two implementations: an HTTP client
//! for the provider's backend API and a static in-memory provider.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};

/// Metadata key holding the user's tier label.
pub const TIER_METADATA_KEY: &str = "tier";

/// Opaque, stable user identifier assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user as returned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Provider user ID
    pub id: String,

    /// Private metadata, readable only with the backend key
    #[serde(default)]
    pub private_metadata: Option<Map<String, Value>>,
}

impl UserRecord {
    /// Create a user record with the given private metadata.
    pub fn new(id: impl Into<String>, private_metadata: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            private_metadata: Some(private_metadata),
        }
    }

    /// Raw `tier` metadata entry, if any.
    pub fn raw_tier(&self) -> Option<&Value> {
        self.private_metadata
            .as_ref()
            .and_then(|m| m.get(TIER_METADATA_KEY))
    }
}

/// Lookup of users at the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch a user with private metadata.
    ///
    /// Fails with `UserNotFound` for unknown users and `InternalLookup`
    /// for any transport or service failure.
    async fn get_user(&self, user_id: &UserId) -> AuthResult<UserRecord>;
}

/// Configuration for the identity provider's backend API.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentityEndpoint {
    /// Base URL (e.g., "https://api.identity.example.com").
    pub base_url: String,

    /// Backend secret key.
    pub secret_key: Option<String>,
}

impl fmt::Debug for IdentityEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityEndpoint")
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// HTTP client for the identity provider's backend API.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    /// HTTP client instance.
    client: Client,

    /// Endpoint configuration.
    endpoint: IdentityEndpoint,
}

impl HttpIdentityProvider {
    /// Create a new identity client.
    pub fn new(endpoint: IdentityEndpoint, timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Build `{base}/v1/users/{id}` with the id as a single path segment.
    fn user_url(&self, user_id: &UserId) -> AuthResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint.base_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid identity API URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AuthError::ConfigError("Identity API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "users", user_id.as_str()]);

        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_user(&self, user_id: &UserId) -> AuthResult<UserRecord> {
        debug!("Fetching user from identity provider");

        let url = self.user_url(user_id)?;
        let mut request = self.client.get(url);

        if let Some(ref secret_key) = self.endpoint.secret_key {
            request = request.bearer_auth(secret_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Identity provider request failed");
            AuthError::InternalLookup(format!("request failed: {}", e))
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AuthError::UserNotFound(user_id.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            error!("Identity provider rejected the backend key");
            return Err(AuthError::InternalLookup(
                "identity provider rejected credentials".to_string(),
            ));
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Identity provider error ({}): {}", status.as_u16(), message);
            return Err(AuthError::InternalLookup(format!(
                "identity provider returned {}",
                status.as_u16()
            )));
        }

        response
            .json::<UserRecord>()
            .await
            .map_err(|e| AuthError::InternalLookup(format!("invalid user response: {}", e)))
    }
}

/// In-memory identity provider.
///
/// Suitable for local development and tests.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl StaticIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user whose private metadata is the given JSON object.
    ///
    /// Non-object values produce a user without private metadata.
    pub fn with_user(mut self, user_id: impl Into<String>, private_metadata: Value) -> Self {
        let id = user_id.into();
        let record = UserRecord {
            id: id.clone(),
            private_metadata: match private_metadata {
                Value::Object(map) => Some(map),
                _ => None,
            },
        };
        self.users.get_mut().insert(UserId::new(id), record);
        self
    }

    /// Insert or replace a user.
    pub async fn insert(&self, record: UserRecord) {
        let mut users = self.users.write().await;
        users.insert(UserId::new(record.id.clone()), record);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_user(&self, user_id: &UserId) -> AuthResult<UserRecord> {
        let users = self.users.read().await;
        users
            .get(user_id)
            .cloned()
            .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))
    }
}
