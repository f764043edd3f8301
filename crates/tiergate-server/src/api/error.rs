//! API error responses.
//!
//! Every failure leaves the server as a JSON body `{"code", "message"}`
//! with the matching status. Nothing partial is ever returned alongside
//! an error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tiergate_auth::AuthError;
use tiergate_events::StoreError;
use tracing::{error, warn};

/// Error body.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorBody {
    /// Stable machine-readable code (e.g. `UNAUTHORIZED`).
    pub code: String,

    /// Human-readable message.
    pub message: String,
}

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Lookup and config details stay in the logs.
        let message = match err {
            AuthError::InternalLookup(_) => "Failed to look up user".to_string(),
            AuthError::InvalidTierConfig(_) => "Invalid user tier configuration".to_string(),
            AuthError::ConfigError(_) => "Server misconfigured".to_string(),
            ref other => other.to_string(),
        };

        if err.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, "Request rejected");
        }

        Self::new(status, err.error_code(), message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, "Event store query failed");
        Self::internal(err.error_code(), "Failed to fetch events")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
