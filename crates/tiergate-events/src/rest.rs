//! REST data store client.
//!
//! HTTP client for a PostgREST-style data API. Events are selected with a
//! `tier=in.(...)` filter and ordered by `event_date` on the server side.

use crate::store::{EventStore, StoreError, StoreResult};
use crate::types::Event;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tiergate_tiers::AllowedTierSet;
use tracing::{debug, error, instrument, warn};

/// Configuration for the data store endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct RestStoreEndpoint {
    /// Base URL (e.g., "https://project.db.example.com").
    pub base_url: String,

    /// API key sent as `apikey` and bearer token.
    pub api_key: Option<String>,

    /// Table holding the events.
    pub table: String,
}

impl fmt::Debug for RestStoreEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStoreEndpoint")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("table", &self.table)
            .finish()
    }
}

/// Event store backed by a REST data API.
#[derive(Debug, Clone)]
pub struct RestEventStore {
    /// HTTP client instance.
    client: Client,

    /// Endpoint configuration.
    endpoint: RestStoreEndpoint,
}

impl RestEventStore {
    /// Create a new store client.
    pub fn new(endpoint: RestStoreEndpoint, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Build `{base}/rest/v1/{table}?select=*&tier=in.(..)&order=event_date.asc`.
    fn query_url(&self, tiers: &AllowedTierSet) -> StoreResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint.base_url)
            .map_err(|e| StoreError::Config(format!("Invalid store URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| StoreError::Config("Store URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1", self.endpoint.table.as_str()]);

        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("tier", &format!("in.({})", tiers.labels().join(",")))
            .append_pair("order", "event_date.asc");

        Ok(url)
    }
}

#[async_trait]
impl EventStore for RestEventStore {
    #[instrument(skip(self, tiers), fields(allowed = ?tiers.labels()))]
    async fn events_in_tiers(&self, tiers: &AllowedTierSet) -> StoreResult<Vec<Event>> {
        debug!("Querying events from data store");

        let url = self.query_url(tiers)?;
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(ref api_key) = self.endpoint.api_key {
            request = request.header("apikey", api_key).bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Data store request failed");
            StoreError::DataSource(format!("request failed: {}", e))
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            error!("Data store authentication failed");
            return Err(StoreError::Authentication);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Data store error ({}): {}", status.as_u16(), message);
            return Err(StoreError::DataSource(format!(
                "store returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        response
            .json::<Vec<Event>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}
