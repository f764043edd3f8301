//! Tier status and event listing endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tiergate_auth::TierLabelPolicy;
use tiergate_events::Event;
use tiergate_tiers::{allowed_tiers_for, Tier};
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::session::Session;
use crate::state::AppState;

/// Response body of `GET /tier-status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierStatus {
    pub tier: Tier,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tier-status", get(tier_status))
        .route("/events", get(list_events))
}

/// `GET /tier-status`: the caller's tier, unknown labels read as free.
#[instrument(skip_all)]
async fn tier_status(
    State(state): State<AppState>,
    Session(session): Session,
) -> Result<Json<TierStatus>, ApiError> {
    let tier = state
        .resolver()
        .resolve_with(&session, TierLabelPolicy::Lenient)
        .await?;
    Ok(Json(TierStatus { tier }))
}

/// `GET /events`: events at or below the caller's tier, oldest first.
///
/// The tier is resolved afresh on every request and the data store is
/// only queried once the caller is known.
#[instrument(skip_all)]
async fn list_events(
    State(state): State<AppState>,
    Session(session): Session,
) -> Result<Json<Vec<Event>>, ApiError> {
    let tier = state
        .resolver()
        .resolve_with(&session, state.events_label_policy())
        .await?;

    let allowed = allowed_tiers_for(tier);
    let events = state.fetcher().fetch(&allowed).await?;

    info!(tier = %tier, count = events.len(), "Listed events");
    Ok(Json(events))
}
