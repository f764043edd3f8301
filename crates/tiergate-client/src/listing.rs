//! Event listing view model.
//!
//! A listing is computed in one pass from immutable inputs: the caller's
//! tier, the requested tier selection and the fetched events. The result
//! is a [`ListingState`] value; nothing is mutated in place and a retry
//! is simply another call to [`load_listing`].
//!
//! Narrowing here is presentational. The server has already removed every
//! event the caller may not see.

use serde::Serialize;
use tiergate_events::Event;
use tiergate_tiers::{Navigation, Tier};
use tracing::{debug, warn};

use crate::client::{ClientError, EventsClient};

/// How the fetched events are narrowed to the selected tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrowMode {
    /// Events of exactly the selected tier, plus free events.
    #[default]
    SelectedOrFree,

    /// Events of the selected tier and every tier below it.
    AtOrBelow,
}

impl NarrowMode {
    /// Check whether an event of `tier` is shown under `selected`.
    pub fn shows(self, tier: Tier, selected: Tier) -> bool {
        match self {
            NarrowMode::SelectedOrFree => tier == selected || tier == Tier::Free,
            NarrowMode::AtOrBelow => tier <= selected,
        }
    }
}

/// Narrow fetched events to the selected tier, keeping their order.
pub fn narrow_events(events: &[Event], selected: Tier, mode: NarrowMode) -> Vec<Event> {
    events
        .iter()
        .filter(|e| mode.shows(e.tier, selected))
        .cloned()
        .collect()
}

/// What the caller asked to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRequest {
    /// Raw `?tier=` selection, if any.
    pub requested_tier: Option<String>,

    /// Narrowing mode.
    pub mode: NarrowMode,
}

impl ListingRequest {
    /// Request a specific tier selection.
    pub fn for_tier(tier: impl Into<String>) -> Self {
        Self {
            requested_tier: Some(tier.into()),
            ..Self::default()
        }
    }

    /// Use a different narrowing mode.
    pub fn with_mode(mut self, mode: NarrowMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A successfully loaded listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    /// Navigation entries and the active selection.
    pub navigation: Navigation,

    /// Number of events the server returned.
    pub fetched: usize,

    /// Events to display, oldest first.
    pub events: Vec<Event>,
}

impl ListingView {
    /// Build a view from fetched events.
    pub fn new(navigation: Navigation, fetched: Vec<Event>, mode: NarrowMode) -> Self {
        let events = narrow_events(&fetched, navigation.active_tier(), mode);
        Self {
            navigation,
            fetched: fetched.len(),
            events,
        }
    }

    /// The tier the listing is narrowed to.
    pub fn selected_tier(&self) -> Tier {
        self.navigation.active_tier()
    }

    /// Message to show instead of an empty list.
    pub fn empty_message(&self) -> Option<String> {
        if !self.events.is_empty() {
            return None;
        }
        if self.fetched == 0 {
            Some("No events found.".to_string())
        } else {
            Some(format!(
                "No {} or free events available.",
                self.selected_tier().display_name().to_lowercase()
            ))
        }
    }

    /// Whether to offer a way back to the unnarrowed listing.
    pub fn offers_show_all(&self) -> bool {
        self.events.is_empty() && self.fetched > 0 && self.selected_tier() != Tier::Free
    }
}

/// Outcome of loading a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingState {
    /// Events were fetched; the list may be empty.
    Loaded(ListingView),

    /// Events could not be fetched.
    Failed {
        /// Navigation built from the caller's tier.
        navigation: Navigation,
        /// User-facing message.
        message: String,
        /// Whether trying again may help.
        retryable: bool,
    },
}

impl ListingState {
    /// The loaded view, if any.
    pub fn view(&self) -> Option<&ListingView> {
        match self {
            ListingState::Loaded(view) => Some(view),
            ListingState::Failed { .. } => None,
        }
    }

    /// Navigation for either outcome.
    pub fn navigation(&self) -> &Navigation {
        match self {
            ListingState::Loaded(view) => &view.navigation,
            ListingState::Failed { navigation, .. } => navigation,
        }
    }
}

fn failure_message(err: &ClientError) -> (String, bool) {
    match err {
        ClientError::Unauthorized | ClientError::UserNotFound => (
            "Failed to load events. Please Sign in or Sign up.".to_string(),
            false,
        ),
        _ => ("Failed to load events. Please try again.".to_string(), true),
    }
}

/// Load a listing: tier, then events, then narrowing.
///
/// A failed tier lookup falls back to `free` so navigation can still be
/// shown. A failed event fetch yields [`ListingState::Failed`], never an
/// empty listing.
pub async fn load_listing(client: &EventsClient, request: &ListingRequest) -> ListingState {
    let tier = match client.tier_status().await {
        Ok(tier) => tier,
        Err(e) => {
            warn!(error = %e, "Failed to fetch user tier, using free");
            Tier::Free
        }
    };

    let navigation = Navigation::new(tier, request.requested_tier.as_deref());

    match client.events().await {
        Ok(events) => {
            let view = ListingView::new(navigation, events, request.mode);
            debug!(
                fetched = view.fetched,
                shown = view.events.len(),
                selected = %view.selected_tier(),
                "Listing loaded"
            );
            ListingState::Loaded(view)
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch events");
            let (message, retryable) = failure_message(&e);
            ListingState::Failed {
                navigation,
                message,
                retryable,
            }
        }
    }
}
