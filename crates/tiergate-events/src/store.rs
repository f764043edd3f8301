//! Event store abstraction
//!
//! This module defines the read-only query seam to the data store and an
//! in-memory implementation for single-process use and testing.

use crate::types::Event;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tiergate_tiers::AllowedTierSet;
use tokio::sync::RwLock;

/// Event store error types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store unreachable or returned an error
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Store answered with something that is not a list of events
    #[error("Invalid store response: {0}")]
    InvalidResponse(String),

    /// Store rejected our credentials
    #[error("Data source authentication failed")]
    Authentication,

    /// Store is misconfigured
    #[error("Store configuration error: {0}")]
    Config(String),
}

/// Result type for event store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::DataSource(_) => "DATA_SOURCE_ERROR",
            StoreError::InvalidResponse(_) => "DATA_SOURCE_ERROR",
            StoreError::Authentication => "DATA_SOURCE_ERROR",
            StoreError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Read-only query interface to the event data store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Select events whose tier is in `tiers`, ordered by event date
    /// ascending.
    async fn events_in_tiers(&self, tiers: &AllowedTierSet) -> StoreResult<Vec<Event>>;
}

/// In-memory event store.
///
/// Suitable for local development and tests. Events are kept in
/// insertion order; queries return them ordered by date.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `events`.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
        }
    }

    /// Load events from a JSON file containing an array of event rows.
    pub fn from_json_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let events: Vec<Event> = serde_json::from_str(&contents).map_err(|e| {
            StoreError::Config(format!("invalid events file {}: {}", path.display(), e))
        })?;
        Ok(Self::with_events(events))
    }

    /// Add an event.
    pub async fn insert(&self, event: Event) {
        self.events.write().await.push(event);
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn events_in_tiers(&self, tiers: &AllowedTierSet) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut selected: Vec<Event> = events
            .iter()
            .filter(|e| tiers.contains(e.tier))
            .cloned()
            .collect();
        selected.sort_by_key(|e| e.event_date);
        Ok(selected)
    }
}
