//! # Tiergate Events
//!
//! This crate reads tier-gated event records from the data store.
//!
//! ## Overview
//!
//! The tiergate-events crate handles:
//! - **Event records**: The listable `Event` type
//! - **Stores**: A read-only `EventStore` seam with REST and in-memory
//!   implementations
//! - **Fetching**: `EventFetcher`, which enforces the allowed tier set and
//!   date ordering on whatever the store returns
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiergate_events::{EventFetcher, MemoryEventStore};
//! use tiergate_tiers::{allowed_tiers_for, Tier};
//!
//! async fn example() {
//!     let store = MemoryEventStore::from_json_file("events.json").unwrap();
//!     let fetcher = EventFetcher::new(Arc::new(store));
//!
//!     let events = fetcher.fetch(&allowed_tiers_for(Tier::Gold)).await.unwrap();
//!     println!("{} events visible to gold members", events.len());
//! }
//! ```

pub mod fetch;
pub mod rest;
pub mod store;
pub mod types;

// Re-export main types
pub use fetch::EventFetcher;
pub use rest::{RestEventStore, RestStoreEndpoint};
pub use store::{EventStore, MemoryEventStore, StoreError, StoreResult};
pub use types::Event;
