//! Tier-filtered event fetching
//!
//! Wraps an [`EventStore`] and guarantees the two properties callers rely
//! on regardless of how the store behaves: no event outside the allowed
//! set is returned, and results are non-decreasing by date.

use crate::store::{EventStore, StoreResult};
use crate::types::Event;
use std::sync::Arc;
use tiergate_tiers::AllowedTierSet;
use tracing::{debug, instrument, warn};

/// Fetches the events visible under an allowed tier set.
#[derive(Clone)]
pub struct EventFetcher {
    store: Arc<dyn EventStore>,
}

impl std::fmt::Debug for EventFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFetcher").finish_non_exhaustive()
    }
}

impl EventFetcher {
    /// Create a fetcher over a store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Fetch events whose tier is in `allowed`, ordered by date ascending.
    ///
    /// Store failures are returned as errors, never as an empty list.
    /// Events with equal dates keep the order the store returned them in.
    #[instrument(skip(self, allowed), fields(ceiling = %allowed.max()))]
    pub async fn fetch(&self, allowed: &AllowedTierSet) -> StoreResult<Vec<Event>> {
        let mut events = self.store.events_in_tiers(allowed).await?;

        let before = events.len();
        events.retain(|e| allowed.contains(e.tier));
        if events.len() != before {
            warn!(
                dropped = before - events.len(),
                "Store returned events outside the allowed tiers"
            );
        }

        events.sort_by_key(|e| e.event_date);

        debug!(count = events.len(), "Fetched events");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryEventStore, StoreError};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tiergate_tiers::{allowed_tiers_for, Tier};

    fn event(id: &str, day: u32, tier: Tier) -> Event {
        Event::new(
            id,
            format!("Event {}", id),
            "",
            Utc.with_ymd_and_hms(2025, 9, day, 18, 0, 0).unwrap(),
            tier,
        )
    }

    /// Store that ignores the filter and returns everything unsorted.
    struct CarelessStore(Vec<Event>);

    #[async_trait]
    impl EventStore for CarelessStore {
        async fn events_in_tiers(&self, _tiers: &AllowedTierSet) -> StoreResult<Vec<Event>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl EventStore for BrokenStore {
        async fn events_in_tiers(&self, _tiers: &AllowedTierSet) -> StoreResult<Vec<Event>> {
            Err(StoreError::DataSource("connection refused".to_string()))
        }
    }

    fn all_tiers_fixture() -> Vec<Event> {
        vec![
            event("plat", 2, Tier::Platinum),
            event("gold", 9, Tier::Gold),
            event("free", 5, Tier::Free),
            event("silver", 1, Tier::Silver),
        ]
    }

    #[tokio::test]
    async fn test_gold_user_sees_free_silver_gold_sorted() {
        let fetcher = EventFetcher::new(Arc::new(MemoryEventStore::with_events(
            all_tiers_fixture(),
        )));

        let events = fetcher.fetch(&allowed_tiers_for(Tier::Gold)).await.unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(ids, vec!["silver", "free", "gold"]);
    }

    #[tokio::test]
    async fn test_free_user_sees_only_free() {
        let fetcher = EventFetcher::new(Arc::new(MemoryEventStore::with_events(
            all_tiers_fixture(),
        )));

        let events = fetcher.fetch(&allowed_tiers_for(Tier::Free)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tier, Tier::Free);
    }

    #[tokio::test]
    async fn test_never_returns_events_outside_allowed_set() {
        let fetcher = EventFetcher::new(Arc::new(CarelessStore(all_tiers_fixture())));

        for tier in Tier::ALL {
            let allowed = allowed_tiers_for(tier);
            let events = fetcher.fetch(&allowed).await.unwrap();

            assert_eq!(events.len(), allowed.len());
            assert!(events.iter().all(|e| allowed.contains(e.tier)));
            assert!(events.windows(2).all(|w| w[0].event_date <= w[1].event_date));
        }
    }

    #[tokio::test]
    async fn test_equal_dates_keep_store_order() {
        let fetcher = EventFetcher::new(Arc::new(CarelessStore(vec![
            event("b", 3, Tier::Free),
            event("a", 3, Tier::Free),
            event("c", 1, Tier::Free),
        ])));

        let events = fetcher.fetch(&allowed_tiers_for(Tier::Free)).await.unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_an_empty_list() {
        let fetcher = EventFetcher::new(Arc::new(BrokenStore));
        let result = fetcher.fetch(&allowed_tiers_for(Tier::Platinum)).await;
        assert!(matches!(result, Err(StoreError::DataSource(_))));
    }
}
