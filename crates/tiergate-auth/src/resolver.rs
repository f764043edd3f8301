//! Tier resolution
//!
//! Turns an authenticated session into exactly one [`Tier`] by reading the
//! `tier` entry of the user's private metadata. The lookup happens on every
//! call; tier changes at the identity provider take effect immediately.

use crate::claims::SessionClaims;
use crate::error::{AuthError, AuthResult};
use crate::identity::{IdentityProvider, UserId};
use serde_json::Value;
use std::sync::Arc;
use tiergate_tiers::Tier;
use tracing::{debug, instrument, warn};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider user ID
    pub user_id: UserId,

    /// Session ID, when the token carries one
    pub session_id: Option<String>,
}

impl From<&SessionClaims> for Identity {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.user_id(),
            session_id: claims.sid.clone(),
        }
    }
}

/// Authentication state of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No credentials were presented
    Anonymous,

    /// A valid session
    Authenticated(Identity),
}

impl SessionState {
    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            SessionState::Anonymous => None,
        }
    }

    /// The authenticated identity, or `Unauthorized`.
    pub fn require(&self) -> AuthResult<&Identity> {
        self.identity()
            .ok_or_else(|| AuthError::Unauthorized("authentication required".to_string()))
    }
}

/// How to treat a stored tier label that is present but not a known tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TierLabelPolicy {
    /// Downgrade to `free`
    #[default]
    Lenient,

    /// Fail with `InvalidTierConfig`
    Strict,
}

/// Interpret a raw metadata value as a tier.
///
/// Absent, `null` and empty-string labels are `free` under both policies.
/// Other unrecognized values (unknown strings, numbers, objects) are
/// `free` under [`TierLabelPolicy::Lenient`] and an error under
/// [`TierLabelPolicy::Strict`].
pub fn tier_from_metadata(raw: Option<&Value>, policy: TierLabelPolicy) -> AuthResult<Tier> {
    let label = match raw {
        None | Some(Value::Null) => return Ok(Tier::Free),
        Some(Value::String(s)) if s.is_empty() => return Ok(Tier::Free),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return match policy {
                TierLabelPolicy::Lenient => {
                    debug!("Non-string tier metadata, using free");
                    Ok(Tier::Free)
                }
                TierLabelPolicy::Strict => Err(AuthError::InvalidTierConfig(format!(
                    "tier metadata is not a string: {}",
                    other
                ))),
            }
        }
    };

    match (Tier::parse(label), policy) {
        (Some(tier), _) => Ok(tier),
        (None, TierLabelPolicy::Lenient) => {
            debug!(label, "Unrecognized tier label, using free");
            Ok(Tier::Free)
        }
        (None, TierLabelPolicy::Strict) => Err(AuthError::InvalidTierConfig(format!(
            "unknown tier label {:?}",
            label
        ))),
    }
}

/// Resolves the tier of the caller.
#[derive(Clone)]
pub struct TierResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for TierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierResolver").finish_non_exhaustive()
    }
}

impl TierResolver {
    /// Create a resolver backed by an identity provider.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the caller's tier, downgrading invalid labels to `free`.
    pub async fn resolve(&self, session: &SessionState) -> AuthResult<Tier> {
        self.resolve_with(session, TierLabelPolicy::Lenient).await
    }

    /// Resolve the caller's tier under an explicit label policy.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for an anonymous session; the provider is not called
    /// - `UserNotFound` / `InternalLookup` from the provider
    /// - `InvalidTierConfig` under [`TierLabelPolicy::Strict`]
    #[instrument(skip(self, session), fields(user_id = tracing::field::Empty))]
    pub async fn resolve_with(
        &self,
        session: &SessionState,
        policy: TierLabelPolicy,
    ) -> AuthResult<Tier> {
        let identity = session.require()?;
        tracing::Span::current().record("user_id", tracing::field::display(&identity.user_id));

        let user = self.provider.get_user(&identity.user_id).await?;

        let tier = tier_from_metadata(user.raw_tier(), policy).map_err(|e| {
            warn!(error = %e, "Invalid tier in user metadata");
            e
        })?;

        debug!(tier = %tier, "Resolved user tier");
        Ok(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{StaticIdentityProvider, UserRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(user_id: &str) -> SessionState {
        SessionState::Authenticated(Identity {
            user_id: UserId::new(user_id),
            session_id: None,
        })
    }

    fn resolver(provider: StaticIdentityProvider) -> TierResolver {
        TierResolver::new(Arc::new(provider))
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn get_user(&self, user_id: &UserId) -> AuthResult<UserRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UserRecord {
                id: user_id.to_string(),
                private_metadata: None,
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn get_user(&self, _user_id: &UserId) -> AuthResult<UserRecord> {
            Err(AuthError::InternalLookup("connection reset".to_string()))
        }
    }

    #[test]
    fn test_metadata_labels() {
        let lenient = TierLabelPolicy::Lenient;
        assert_eq!(tier_from_metadata(Some(&json!("gold")), lenient).unwrap(), Tier::Gold);
        assert_eq!(tier_from_metadata(Some(&json!("bronze")), lenient).unwrap(), Tier::Free);
        assert_eq!(tier_from_metadata(Some(&json!("")), lenient).unwrap(), Tier::Free);
        assert_eq!(tier_from_metadata(Some(&Value::Null), lenient).unwrap(), Tier::Free);
        assert_eq!(tier_from_metadata(Some(&json!(3)), lenient).unwrap(), Tier::Free);
        assert_eq!(tier_from_metadata(None, lenient).unwrap(), Tier::Free);
    }

    #[test]
    fn test_strict_policy() {
        let strict = TierLabelPolicy::Strict;
        assert_eq!(tier_from_metadata(Some(&json!("silver")), strict).unwrap(), Tier::Silver);
        assert_eq!(tier_from_metadata(None, strict).unwrap(), Tier::Free);
        assert_eq!(tier_from_metadata(Some(&json!("")), strict).unwrap(), Tier::Free);
        assert!(matches!(
            tier_from_metadata(Some(&json!("bronze")), strict),
            Err(AuthError::InvalidTierConfig(_))
        ));
        assert!(matches!(
            tier_from_metadata(Some(&json!(["gold"])), strict),
            Err(AuthError::InvalidTierConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_resolves_stored_tier() {
        let resolver = resolver(
            StaticIdentityProvider::new().with_user("user_gold", json!({ "tier": "gold" })),
        );
        assert_eq!(resolver.resolve(&session("user_gold")).await.unwrap(), Tier::Gold);
    }

    #[tokio::test]
    async fn test_invalid_labels_resolve_to_free() {
        let resolver = resolver(
            StaticIdentityProvider::new()
                .with_user("bronze", json!({ "tier": "bronze" }))
                .with_user("null", json!({ "tier": null }))
                .with_user("empty", json!({ "tier": "" }))
                .with_user("none", json!({})),
        );

        for user in ["bronze", "null", "empty", "none"] {
            assert_eq!(resolver.resolve(&session(user)).await.unwrap(), Tier::Free);
        }
    }

    #[tokio::test]
    async fn test_anonymous_session_never_reaches_provider() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let resolver = TierResolver::new(provider.clone());

        let result = resolver.resolve(&SessionState::Anonymous).await;

        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_call_looks_up_afresh() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let resolver = TierResolver::new(provider.clone());

        resolver.resolve(&session("user_1")).await.unwrap();
        resolver.resolve(&session("user_1")).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let resolver = TierResolver::new(Arc::new(FailingProvider));
        let result = resolver.resolve(&session("user_1")).await;
        assert!(matches!(result, Err(AuthError::InternalLookup(_))));
    }

    #[tokio::test]
    async fn test_tier_change_takes_effect_immediately() {
        let provider = Arc::new(
            StaticIdentityProvider::new().with_user("user_1", json!({ "tier": "silver" })),
        );
        let resolver = TierResolver::new(provider.clone());
        assert_eq!(resolver.resolve(&session("user_1")).await.unwrap(), Tier::Silver);

        let mut metadata = serde_json::Map::new();
        metadata.insert("tier".to_string(), json!("platinum"));
        provider.insert(UserRecord::new("user_1", metadata)).await;

        assert_eq!(resolver.resolve(&session("user_1")).await.unwrap(), Tier::Platinum);
    }

    #[test]
    fn test_identity_from_claims() {
        let claims = SessionClaims::new("user_9", chrono::Duration::minutes(10))
            .with_session_id("sess_1");
        let identity = Identity::from(&claims);
        assert_eq!(identity.user_id, UserId::new("user_9"));
        assert_eq!(identity.session_id.as_deref(), Some("sess_1"));
    }
}
