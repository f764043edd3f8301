//! Session token verification
//!
//! This module verifies the session JWTs issued by the identity provider
//! using the jsonwebtoken crate. It supports HS256, HS384, HS512, RS256,
//! RS384, RS512, ES256 and ES384.

use crate::claims::SessionClaims;
use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// JWT configuration for session verification.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC algorithms (HS256, HS384, HS512)
    pub secret: Option<String>,

    /// Public key (PEM) for RSA/EC algorithms
    pub public_key: Option<String>,

    /// Private key (PEM) for RSA/EC algorithms; only needed to issue tokens
    pub private_key: Option<String>,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Expected issuer, if any
    pub issuer: Option<String>,

    /// Accepted audiences; empty disables the audience check
    pub audience: Vec<String>,

    /// Allowed clock skew in seconds
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            public_key: None,
            private_key: None,
            algorithm: JwtAlgorithm::HS256,
            issuer: None,
            audience: Vec::new(),
            leeway_secs: 5,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key.is_some())
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
}

impl JwtAlgorithm {
    /// Check if the algorithm verifies with a shared secret.
    pub fn is_hmac(self) -> bool {
        matches!(self, JwtAlgorithm::HS256 | JwtAlgorithm::HS384 | JwtAlgorithm::HS512)
    }

    fn is_rsa(self) -> bool {
        matches!(self, JwtAlgorithm::RS256 | JwtAlgorithm::RS384 | JwtAlgorithm::RS512)
    }
}

impl FromStr for JwtAlgorithm {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HS256" => Ok(JwtAlgorithm::HS256),
            "HS384" => Ok(JwtAlgorithm::HS384),
            "HS512" => Ok(JwtAlgorithm::HS512),
            "RS256" => Ok(JwtAlgorithm::RS256),
            "RS384" => Ok(JwtAlgorithm::RS384),
            "RS512" => Ok(JwtAlgorithm::RS512),
            "ES256" => Ok(JwtAlgorithm::ES256),
            "ES384" => Ok(JwtAlgorithm::ES384),
            other => Err(AuthError::ConfigError(format!(
                "Unsupported JWT algorithm: {}",
                other
            ))),
        }
    }
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
            JwtAlgorithm::RS256 => Algorithm::RS256,
            JwtAlgorithm::RS384 => Algorithm::RS384,
            JwtAlgorithm::RS512 => Algorithm::RS512,
            JwtAlgorithm::ES256 => Algorithm::ES256,
            JwtAlgorithm::ES384 => Algorithm::ES384,
        }
    }
}

/// Verifier for session tokens.
pub struct SessionVerifier {
    config: JwtConfig,
    decoding_key: DecodingKey,
    encoding_key: Option<EncodingKey>,
}

impl fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("config", &self.config)
            .field("decoding_key", &"[REDACTED]")
            .field("encoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionVerifier {
    /// Create a new verifier with the given configuration.
    ///
    /// # Returns
    ///
    /// The verifier or a configuration error if the required key for the
    /// algorithm is missing or unreadable
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        let decoding_key = Self::create_decoding_key(&config)?;
        let encoding_key = Self::create_encoding_key(&config)?;

        Ok(Self {
            config,
            decoding_key,
            encoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        let config = JwtConfig {
            secret: Some(secret.into()),
            algorithm: JwtAlgorithm::HS256,
            ..Default::default()
        };
        Self::new(config)
    }

    fn create_decoding_key(config: &JwtConfig) -> AuthResult<DecodingKey> {
        if config.algorithm.is_hmac() {
            let secret = config
                .secret
                .as_ref()
                .ok_or_else(|| AuthError::ConfigError("Secret required for HMAC".to_string()))?;
            return Ok(DecodingKey::from_secret(secret.as_bytes()));
        }

        let key = config.public_key.as_ref().ok_or_else(|| {
            AuthError::ConfigError("Public key required for RSA/EC".to_string())
        })?;

        if config.algorithm.is_rsa() {
            DecodingKey::from_rsa_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid RSA public key: {}", e)))
        } else {
            DecodingKey::from_ec_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid EC public key: {}", e)))
        }
    }

    fn create_encoding_key(config: &JwtConfig) -> AuthResult<Option<EncodingKey>> {
        if config.algorithm.is_hmac() {
            return Ok(config
                .secret
                .as_ref()
                .map(|secret| EncodingKey::from_secret(secret.as_bytes())));
        }

        let Some(key) = config.private_key.as_ref() else {
            return Ok(None);
        };

        let key = if config.algorithm.is_rsa() {
            EncodingKey::from_rsa_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid RSA private key: {}", e)))?
        } else {
            EncodingKey::from_ec_pem(key.as_bytes())
                .map_err(|e| AuthError::ConfigError(format!("Invalid EC private key: {}", e)))?
        };
        Ok(Some(key))
    }

    /// Validate and decode a session token.
    ///
    /// # Returns
    ///
    /// Decoded claims if the signature, expiry, not-before and (when
    /// configured) issuer and audience all check out
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.leeway = self.config.leeway_secs;
        validation.validate_nbf = true;

        if let Some(ref issuer) = self.config.issuer {
            validation.set_issuer(&[issuer]);
        }

        if self.config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&self.config.audience);
        }

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    AuthError::InvalidToken("Token not yet valid".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => {
                    AuthError::MissingClaim(claim.clone())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AuthError::MissingClaim("sub".to_string()));
        }

        Ok(token_data.claims)
    }

    /// Encode claims into a signed token.
    ///
    /// Requires the secret (HMAC) or the private key (RSA/EC). Used by
    /// local tooling and tests; production tokens come from the identity
    /// provider.
    pub fn encode_claims(&self, claims: &SessionClaims) -> AuthResult<String> {
        let key = self.encoding_key.as_ref().ok_or_else(|| {
            AuthError::ConfigError("No signing key configured".to_string())
        })?;
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, key)
            .map_err(|e| AuthError::ConfigError(format!("Token encoding failed: {}", e)))
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_secret() -> String {
        "test-secret-key-for-jwt-signing-minimum-32-chars".to_string()
    }

    #[test]
    fn test_verifier_creation() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        assert_eq!(verifier.config().algorithm, JwtAlgorithm::HS256);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = JwtConfig {
            algorithm: JwtAlgorithm::RS256,
            ..Default::default()
        };
        assert!(matches!(
            SessionVerifier::new(config),
            Err(AuthError::ConfigError(_))
        ));
    }

    #[test]
    fn test_token_round_trip() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        let claims = SessionClaims::new("user_123", Duration::hours(1));

        let token = verifier.encode_claims(&claims).unwrap();
        let decoded = verifier.verify(&token).unwrap();

        assert_eq!(decoded.user_id().as_str(), "user_123");
    }

    #[test]
    fn test_invalid_token() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        let result = verifier.verify("invalid-token");

        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = SessionVerifier::with_secret("another-secret-key-that-is-long-enough").unwrap();
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();

        let token = issuer
            .encode_claims(&SessionClaims::new("user_123", Duration::hours(1)))
            .unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        let mut claims = SessionClaims::new("user_123", Duration::hours(1));
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        claims.nbf = None;

        let token = verifier.encode_claims(&claims).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_issuer_is_checked_when_configured() {
        let config = JwtConfig {
            secret: Some(test_secret()),
            issuer: Some("https://id.example.com".to_string()),
            ..Default::default()
        };
        let verifier = SessionVerifier::new(config).unwrap();

        let good = SessionClaims::new("user_123", Duration::hours(1))
            .with_issuer("https://id.example.com");
        let bad = SessionClaims::new("user_123", Duration::hours(1))
            .with_issuer("https://evil.example.com");

        assert!(verifier.verify(&verifier.encode_claims(&good).unwrap()).is_ok());
        assert!(matches!(
            verifier.verify(&verifier.encode_claims(&bad).unwrap()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_audience_list_is_accepted() {
        let config = JwtConfig {
            secret: Some(test_secret()),
            audience: vec!["web".to_string()],
            ..Default::default()
        };
        let verifier = SessionVerifier::new(config).unwrap();

        let listed = SessionClaims::new("user_1", Duration::hours(1))
            .with_audience(vec!["web", "mobile"]);
        let claims = verifier
            .verify(&verifier.encode_claims(&listed).unwrap())
            .unwrap();
        assert_eq!(claims.aud, Some(vec!["web", "mobile"].into()));

        let single = SessionClaims::new("user_1", Duration::hours(1)).with_audience("web");
        assert!(verifier.verify(&verifier.encode_claims(&single).unwrap()).is_ok());

        let other = SessionClaims::new("user_1", Duration::hours(1))
            .with_audience(vec!["admin", "mobile"]);
        assert!(matches!(
            verifier.verify(&verifier.encode_claims(&other).unwrap()),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_empty_subject_is_rejected() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        let token = verifier
            .encode_claims(&SessionClaims::new("", Duration::hours(1)))
            .unwrap();

        assert!(matches!(verifier.verify(&token), Err(AuthError::MissingClaim(_))));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("rs256".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::RS256);
        assert!("none".parse::<JwtAlgorithm>().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let verifier = SessionVerifier::with_secret(test_secret()).unwrap();
        let debug = format!("{:?}", verifier);
        assert!(!debug.contains(&test_secret()));
    }
}
