//! Error types for authentication and tier resolution
//!
//! This module defines all error types that can occur while verifying a
//! session, looking up a user at the identity provider, or resolving the
//! user's tier.

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authenticated session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Session token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Session token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is missing required claims
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Identity provider has no such user
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Identity provider lookup failed (network, service or decoding error)
    #[error("Identity lookup failed: {0}")]
    InternalLookup(String),

    /// Stored tier label is present but not a known tier
    #[error("Invalid tier configuration: {0}")]
    InvalidTierConfig(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Rejected or missing credentials are expected and are not server
    /// errors.
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthorized(_)
            | AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingClaim(_) => 401,

            AuthError::UserNotFound(_) => 404,

            AuthError::InternalLookup(_)
            | AuthError::InvalidTierConfig(_)
            | AuthError::ConfigError(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::MissingClaim(_) => "MISSING_CLAIM",
            AuthError::UserNotFound(_) => "USER_NOT_FOUND",
            AuthError::InternalLookup(_) => "INTERNAL_LOOKUP_ERROR",
            AuthError::InvalidTierConfig(_) => "INVALID_TIER_CONFIG",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}
