//! Server configuration.
//!
//! Configuration is loaded from environment variables with defaults
//! suitable for local development. [`ServerConfig::validate`] checks that
//! the secrets a real deployment needs are present.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tiergate_auth::{IdentityEndpoint, JwtAlgorithm, JwtConfig};
use tiergate_events::RestStoreEndpoint;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the tiergate server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub listen_addr: String,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines.
    pub log_json: bool,

    /// Reject unrecognized stored tier labels on `/events`.
    pub strict_tier_labels: bool,

    /// Serve events from this JSON file instead of the data store.
    pub events_file: Option<PathBuf>,

    /// Session token verification.
    pub jwt: JwtConfig,

    /// Identity provider backend API.
    pub identity: IdentityEndpoint,

    /// Event data store.
    pub store: RestStoreEndpoint,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            strict_tier_labels: false,
            events_file: None,
            jwt: JwtConfig::default(),
            identity: IdentityEndpoint {
                base_url: "http://localhost:4000".to_string(),
                secret_key: None,
            },
            store: RestStoreEndpoint {
                base_url: "http://localhost:54321".to_string(),
                api_key: None,
                table: "events".to_string(),
            },
            timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TIERGATE_LISTEN_ADDR`: bind address (default: 127.0.0.1:3000)
    /// - `TIERGATE_LOG_LEVEL`: log filter when `RUST_LOG` is unset (default: info)
    /// - `TIERGATE_LOG_JSON`: JSON log output (default: false)
    /// - `TIERGATE_STRICT_TIER_LABELS`: strict tier labels on `/events` (default: false)
    /// - `TIERGATE_EVENTS_FILE`: serve events from a JSON file
    /// - `SESSION_JWT_ALGORITHM`: session token algorithm (default: HS256)
    /// - `SESSION_JWT_SECRET`: HMAC secret
    /// - `SESSION_JWT_PUBLIC_KEY`: PEM public key for RSA/EC algorithms
    /// - `SESSION_JWT_ISSUER`: expected issuer
    /// - `SESSION_JWT_AUDIENCE`: comma-separated accepted audiences
    /// - `IDENTITY_API_URL`: identity provider URL (default: http://localhost:4000)
    /// - `IDENTITY_SECRET_KEY`: identity provider backend key
    /// - `EVENT_STORE_URL`: data store URL (default: http://localhost:54321)
    /// - `EVENT_STORE_API_KEY`: data store key
    /// - `EVENT_STORE_TABLE`: events table (default: events)
    /// - `SERVICE_TIMEOUT_SECS`: outbound request timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|s| {
                    let s = s.trim();
                    s.eq_ignore_ascii_case("true") || s == "1"
                })
                .unwrap_or(default)
        };

        let algorithm = match lookup("SESSION_JWT_ALGORITHM") {
            Some(value) => value
                .parse::<JwtAlgorithm>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "SESSION_JWT_ALGORITHM".to_string(),
                    message: e.to_string(),
                })?,
            None => default.jwt.algorithm,
        };

        let timeout_secs = match lookup("SERVICE_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVICE_TIMEOUT_SECS".to_string(),
                message: format!("expected a number of seconds, got {:?}", value),
            })?,
            None => default.timeout_secs,
        };

        let audience = lookup("SESSION_JWT_AUDIENCE")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            listen_addr: lookup("TIERGATE_LISTEN_ADDR").unwrap_or(default.listen_addr),
            log_level: lookup("TIERGATE_LOG_LEVEL").unwrap_or(default.log_level),
            log_json: flag("TIERGATE_LOG_JSON", default.log_json),
            strict_tier_labels: flag("TIERGATE_STRICT_TIER_LABELS", default.strict_tier_labels),
            events_file: lookup("TIERGATE_EVENTS_FILE").map(PathBuf::from),
            jwt: JwtConfig {
                secret: lookup("SESSION_JWT_SECRET"),
                public_key: lookup("SESSION_JWT_PUBLIC_KEY"),
                private_key: None,
                algorithm,
                issuer: lookup("SESSION_JWT_ISSUER"),
                audience,
                ..default.jwt
            },
            identity: IdentityEndpoint {
                base_url: lookup("IDENTITY_API_URL").unwrap_or(default.identity.base_url),
                secret_key: lookup("IDENTITY_SECRET_KEY"),
            },
            store: RestStoreEndpoint {
                base_url: lookup("EVENT_STORE_URL").unwrap_or(default.store.base_url),
                api_key: lookup("EVENT_STORE_API_KEY"),
                table: lookup("EVENT_STORE_TABLE").unwrap_or(default.store.table),
            },
            timeout_secs,
        })
    }

    /// Get the outbound request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate that the keys needed to serve requests are configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.algorithm.is_hmac() {
            if self.jwt.secret.is_none() {
                return Err(ConfigError::MissingEnvVar("SESSION_JWT_SECRET".to_string()));
            }
        } else if self.jwt.public_key.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "SESSION_JWT_PUBLIC_KEY".to_string(),
            ));
        }

        if self.identity.secret_key.is_none() {
            return Err(ConfigError::MissingEnvVar("IDENTITY_SECRET_KEY".to_string()));
        }

        if self.events_file.is_none() && self.store.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("EVENT_STORE_API_KEY".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SERVICE_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.identity.base_url, "http://localhost:4000");
        assert_eq!(config.store.table, "events");
        assert_eq!(config.jwt.algorithm, JwtAlgorithm::HS256);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(!config.strict_tier_labels);
        assert!(config.events_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("TIERGATE_LISTEN_ADDR", "0.0.0.0:8080"),
            ("TIERGATE_STRICT_TIER_LABELS", "true"),
            ("TIERGATE_LOG_JSON", "1"),
            ("SESSION_JWT_ALGORITHM", "rs256"),
            ("SESSION_JWT_AUDIENCE", "web, mobile ,"),
            ("EVENT_STORE_TABLE", "member_events"),
            ("SERVICE_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.strict_tier_labels);
        assert!(config.log_json);
        assert_eq!(config.jwt.algorithm, JwtAlgorithm::RS256);
        assert_eq!(config.jwt.audience, vec!["web", "mobile"]);
        assert_eq!(config.store.table, "member_events");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_flags_ignore_case() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("TIERGATE_STRICT_TIER_LABELS", "TRUE"),
            ("TIERGATE_LOG_JSON", "False"),
        ]))
        .unwrap();
        assert!(config.strict_tier_labels);
        assert!(!config.log_json);
    }

    #[test]
    fn test_invalid_values() {
        let result = ServerConfig::from_lookup(lookup_from(&[("SESSION_JWT_ALGORITHM", "none")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = ServerConfig::from_lookup(lookup_from(&[("SERVICE_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate() {
        let mut config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(ref key)) if key == "SESSION_JWT_SECRET"
        ));

        config.jwt.secret = Some("session-secret".to_string());
        config.identity.secret_key = Some("sk_test".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(ref key)) if key == "EVENT_STORE_API_KEY"
        ));

        config.events_file = Some(PathBuf::from("events.json"));
        assert!(config.validate().is_ok());

        config.events_file = None;
        config.store.api_key = Some("anon".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_asymmetric_needs_public_key() {
        let mut config = ServerConfig::default();
        config.jwt.algorithm = JwtAlgorithm::ES256;
        config.jwt.secret = Some("unused".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingEnvVar(ref key)) if key == "SESSION_JWT_PUBLIC_KEY"
        ));
    }
}
