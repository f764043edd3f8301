//! Session token claims
//!
//! The identity provider issues short-lived session JWTs. Only the subject
//! (the opaque user id) and the standard time claims matter here; tier
//! information is never trusted from the token and is always looked up.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// The `aud` claim, which may be a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Audience::One(audience.to_string())
    }
}

impl From<Vec<&str>> for Audience {
    fn from(audiences: Vec<&str>) -> Self {
        Audience::Many(audiences.into_iter().map(String::from).collect())
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (opaque user ID)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,

    /// Not before (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Session ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl SessionClaims {
    /// Create claims for a user, valid for `duration` from now.
    pub fn new(user_id: impl Into<String>, duration: chrono::Duration) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: Some(now.timestamp()),
            iss: None,
            aud: None,
            sid: None,
        }
    }

    /// Get the user ID.
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Set the audience.
    pub fn with_audience(mut self, audience: impl Into<Audience>) -> Self {
        self.aud = Some(audience.into());
        self
    }

    /// Set the session ID.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.sid = Some(session_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let claims = SessionClaims::new("user_2abc", Duration::hours(1));

        assert_eq!(claims.user_id().as_str(), "user_2abc");
        assert!(claims.exp > Utc::now().timestamp());
        assert_eq!(claims.nbf, Some(claims.iat));
    }

    #[test]
    fn test_audience_string_or_list() {
        let single: SessionClaims = serde_json::from_value(serde_json::json!({
            "sub": "user_1", "exp": 1, "aud": "web"
        }))
        .unwrap();
        assert_eq!(single.aud, Some(Audience::One("web".to_string())));

        let list: SessionClaims = serde_json::from_value(serde_json::json!({
            "sub": "user_1", "exp": 1, "aud": ["web", "mobile"]
        }))
        .unwrap();
        assert_eq!(
            list.aud,
            Some(Audience::Many(vec!["web".to_string(), "mobile".to_string()]))
        );
    }

    #[test]
    fn test_optional_claims_are_omitted() {
        let claims = SessionClaims::new("user_2abc", Duration::minutes(5));
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("iss").is_none());
        assert!(json.get("sid").is_none());

        let claims = claims.with_issuer("https://id.example.com").with_session_id("sess_1");
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "https://id.example.com");
        assert_eq!(json["sid"], "sess_1");
    }
}
