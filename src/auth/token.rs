use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::{debug, instrument};

use super::types::Claims;

/// Failure modes of token verification.
///
/// Expiry is the only invalidation mechanism; there is no revocation list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// Configuration for JWT token operations.
///
/// The secret and TTL are fixed at startup and constant for the process
/// lifetime. Tokens are signed with HS256.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl_minutes: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
        }
    }

    /// Reads the signing secret and TTL from the environment.
    pub fn from_env() -> Self {
        let ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            ttl_minutes,
        }
    }

    /// Issues a signed token for the given subject using the configured TTL.
    #[instrument(skip(self, subject))]
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, Duration::minutes(self.ttl_minutes))
    }

    /// Issues a signed token with an explicit TTL.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        debug!(exp = claims.exp, "issuing token");

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "failed to encode token");
            TokenError::Malformed
        })
    }

    /// Verifies a token's signature and expiry and returns its claims.
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Zero leeway so a token is rejected the instant its TTL elapses
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "token verification failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })
    }
}
