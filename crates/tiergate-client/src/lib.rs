//! # Tiergate Client
//!
//! Client for the tiergate HTTP surface and the event listing view model
//! built on top of it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tiergate_client::{load_listing, EventsClient, ListingRequest, ListingState};
//!
//! async fn example() {
//!     let client = EventsClient::new("http://localhost:3000", Duration::from_secs(10))
//!         .unwrap()
//!         .with_session_token("session-token");
//!
//!     match load_listing(&client, &ListingRequest::for_tier("gold")).await {
//!         ListingState::Loaded(view) => {
//!             for event in &view.events {
//!                 println!("{} {}", event.event_date, event.title);
//!             }
//!             if let Some(message) = view.empty_message() {
//!                 println!("{}", message);
//!             }
//!         }
//!         ListingState::Failed { message, .. } => eprintln!("{}", message),
//!     }
//! }
//! ```

pub mod client;
pub mod listing;

pub use client::{ClientError, ClientResult, EventsClient};
pub use listing::{
    load_listing, narrow_events, ListingRequest, ListingState, ListingView, NarrowMode,
};
