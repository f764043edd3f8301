//! # Tiergate Server
//!
//! HTTP surface for tier-gated event listings.
//!
//! ## Endpoints
//!
//! - `GET /tier-status`: `{"tier": ...}` for the authenticated caller
//! - `GET /events`: events at or below the caller's tier, ordered by date
//! - `GET /healthz`, `GET /livez`: health probes
//!
//! Callers authenticate with a session token, either as a bearer token or
//! in the `__session` cookie. Errors are JSON `{"code", "message"}` bodies.

pub mod api;
pub mod config;
pub mod state;

use std::sync::Arc;
use tiergate_auth::{
    AuthError, HttpIdentityProvider, IdentityProvider, SessionVerifier, TierLabelPolicy,
};
use tiergate_events::{EventStore, MemoryEventStore, RestEventStore, StoreError};
use tracing::info;

pub use config::{ConfigError, ServerConfig};
pub use state::AppState;

/// Errors raised while wiring the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build application state from configuration.
///
/// Events come from the file named by `events_file` when set, otherwise
/// from the REST data store.
pub fn build_state(config: &ServerConfig) -> Result<AppState, StartupError> {
    config.validate()?;

    let verifier = SessionVerifier::new(config.jwt.clone())?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(HttpIdentityProvider::new(
        config.identity.clone(),
        config.timeout(),
    )?);

    let store: Arc<dyn EventStore> = match config.events_file {
        Some(ref path) => {
            info!(path = %path.display(), "Serving events from file");
            Arc::new(MemoryEventStore::from_json_file(path)?)
        }
        None => Arc::new(RestEventStore::new(config.store.clone(), config.timeout())?),
    };

    let policy = if config.strict_tier_labels {
        TierLabelPolicy::Strict
    } else {
        TierLabelPolicy::Lenient
    };

    Ok(AppState::new(verifier, identity, store).with_events_label_policy(policy))
}
