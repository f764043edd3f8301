//! Shared application state.

use std::sync::Arc;
use tiergate_auth::{IdentityProvider, SessionVerifier, TierLabelPolicy, TierResolver};
use tiergate_events::{EventFetcher, EventStore};

/// State handed to every request handler.
///
/// Holds only immutable collaborators; no tier or event data is cached
/// between requests.
#[derive(Clone)]
pub struct AppState {
    verifier: Arc<SessionVerifier>,
    resolver: TierResolver,
    fetcher: EventFetcher,
    events_label_policy: TierLabelPolicy,
}

impl AppState {
    /// Create application state from its collaborators.
    pub fn new(
        verifier: SessionVerifier,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            verifier: Arc::new(verifier),
            resolver: TierResolver::new(identity),
            fetcher: EventFetcher::new(store),
            events_label_policy: TierLabelPolicy::Lenient,
        }
    }

    /// Set the tier label policy applied by `/events`.
    pub fn with_events_label_policy(mut self, policy: TierLabelPolicy) -> Self {
        self.events_label_policy = policy;
        self
    }

    /// Session token verifier.
    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    /// Tier resolver.
    pub fn resolver(&self) -> &TierResolver {
        &self.resolver
    }

    /// Event fetcher.
    pub fn fetcher(&self) -> &EventFetcher {
        &self.fetcher
    }

    /// Tier label policy for `/events`.
    pub fn events_label_policy(&self) -> TierLabelPolicy {
        self.events_label_policy
    }
}
