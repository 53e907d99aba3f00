//! Session token utilities.
//!
//! A successful OTP verification establishes a session by minting an HS256
//! JWT whose subject is the account's phone number. The HTTP layer validates
//! the token on profile routes.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account's phone number.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Token identifier.
    pub jti: String,
}

/// Configuration for session token generation and validation.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds.
    pub token_expiry_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("token_expiry_secs", &self.token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

/// Default clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl SessionKeys {
    /// Creates session keys from a shared secret.
    pub fn new(secret: &str, token_expiry_secs: i64, leeway_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_secs,
            leeway_secs,
        }
    }

    /// Issues a session token for the given phone number.
    pub fn issue(&self, phone: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: phone.to_string(),
            exp: (now + Duration::seconds(self.token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::EncodingError(e.to_string()))
    }

    /// Validates a session token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret-at-least-32-bytes-long!!", 900, DEFAULT_LEEWAY_SECS)
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let keys = keys();
        let token = keys.issue("9001112233").unwrap();
        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, "9001112233");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_validate_rejects_garbage() {
        let keys = keys();
        assert!(matches!(
            keys.validate("not.a.token"),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let token = keys().issue("9001112233").unwrap();
        let other = SessionKeys::new("a-completely-different-secret-key!!!", 900, 0);
        assert!(matches!(
            other.validate(&token),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_rejects_expired_token() {
        // Negative expiry puts exp in the past; zero leeway makes it strict.
        let keys = SessionKeys::new("test-secret-at-least-32-bytes-long!!", -60, 0);
        let token = keys.issue("9001112233").unwrap();
        assert!(matches!(
            keys.validate(&token),
            Err(SessionError::TokenExpired)
        ));
    }

    #[test]
    fn test_tokens_carry_unique_jti() {
        let keys = keys();
        let a = keys.validate(&keys.issue("9001112233").unwrap()).unwrap();
        let b = keys.validate(&keys.issue("9001112233").unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let repr = format!("{:?}", keys());
        assert!(repr.contains("[REDACTED]"));
        assert!(!repr.contains("test-secret"));
    }
}
