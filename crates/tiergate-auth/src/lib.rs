//! # Tiergate Authentication
//!
//! This crate authenticates callers and resolves their subscription tier.
//!
//! ## Overview
//!
//! The tiergate-auth crate handles:
//! - **Sessions**: Verifying session JWTs issued by the identity provider
//! - **Identity**: Looking up users and their private metadata
//! - **Tier resolution**: Reading the stored tier label and parsing it into
//!   a [`Tier`](tiergate_tiers::Tier), downgrading invalid labels to `free`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiergate_auth::{
//!     Identity, SessionState, SessionVerifier, StaticIdentityProvider, TierResolver,
//! };
//!
//! async fn example(token: &str) -> Result<(), tiergate_auth::AuthError> {
//!     let verifier = SessionVerifier::with_secret("your-secret-key")?;
//!     let claims = verifier.verify(token)?;
//!
//!     let session = SessionState::Authenticated(Identity {
//!         user_id: claims.user_id(),
//!         session_id: claims.sid.clone(),
//!     });
//!
//!     let provider = StaticIdentityProvider::new()
//!         .with_user(claims.sub.clone(), serde_json::json!({ "tier": "gold" }));
//!     let resolver = TierResolver::new(Arc::new(provider));
//!
//!     let tier = resolver.resolve(&session).await?;
//!     println!("tier: {}", tier);
//!     Ok(())
//! }
//! ```

pub mod claims;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod resolver;

// Re-export main types
pub use claims::{Audience, SessionClaims};
pub use error::{AuthError, AuthResult};
pub use identity::{
    HttpIdentityProvider, IdentityEndpoint, IdentityProvider, StaticIdentityProvider, UserId,
    UserRecord,
};
pub use jwt::{JwtAlgorithm, JwtConfig, SessionVerifier};
pub use resolver::{tier_from_metadata, Identity, SessionState, TierLabelPolicy, TierResolver};
