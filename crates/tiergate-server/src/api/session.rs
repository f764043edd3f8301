//! Session extraction.
//!
//! The session token is read from `Authorization: Bearer <token>`, falling
//! back to the `__session` cookie set by the identity provider's frontend.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use tiergate_auth::{Identity, SessionState};
use tracing::debug;

use crate::api::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "__session";

/// The verified session of the current request.
///
/// Requests without credentials extract as [`SessionState::Anonymous`];
/// handlers decide whether that is acceptable. Credentials that fail
/// verification are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct Session(pub SessionState);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Find the session token in a request's headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| session_cookie(headers))
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            debug!("No session token presented");
            return Ok(Session(SessionState::Anonymous));
        };

        let claims = state.verifier().verify(token)?;
        Ok(Session(SessionState::Authenticated(Identity::from(&claims))))
    }
}
