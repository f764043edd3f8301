//! Tiergate API client.
//!
//! HTTP client for the `/tier-status` and `/events` endpoints. Requests
//! carry the caller's session token as a bearer token.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tiergate_events::Event;
use tiergate_tiers::Tier;
use tracing::{debug, instrument, warn};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// No valid session.
    #[error("Not signed in")]
    Unauthorized,

    /// The identity provider does not know the signed-in user.
    #[error("User not found")]
    UserNotFound,

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error code from the body, when present.
        code: Option<String>,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TierStatusBody {
    tier: Tier,
}

/// Client for a tiergate server.
#[derive(Clone)]
pub struct EventsClient {
    /// HTTP client instance.
    client: Client,

    /// Server base URL.
    base_url: reqwest::Url,

    /// Session token.
    session_token: Option<String>,
}

impl fmt::Debug for EventsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventsClient")
            .field("base_url", &self.base_url.as_str())
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl EventsClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config("Base URL cannot be a base".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            session_token: None,
        })
    }

    /// Attach a session token to every request.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Fetch the caller's tier.
    #[instrument(skip(self))]
    pub async fn tier_status(&self) -> ClientResult<Tier> {
        debug!("Fetching tier status");
        let body: TierStatusBody = self.get("tier-status").await?;
        Ok(body.tier)
    }

    /// Fetch the events visible to the caller, oldest first.
    #[instrument(skip(self))]
    pub async fn events(&self) -> ClientResult<Vec<Event>> {
        debug!("Fetching events");
        self.get("events").await
    }

    fn url(&self, endpoint: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(endpoint);
        }
        url
    }

    async fn get<T>(&self, endpoint: &str) -> ClientResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut request = self.client.get(self.url(endpoint));
        if let Some(ref token) = self.session_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T>(&self, response: reqwest::Response) -> ClientResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Session rejected");
            return Err(ClientError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::UserNotFound);
        }

        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Tiergate API error ({}): {}", status.as_u16(), text);

            let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (Some(body.code), body.message),
                Err(_) => (None, text),
            };
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                code,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
