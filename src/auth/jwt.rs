//! JWT Token Handler
//! Mission: Issue and verify time-boxed bearer tokens carrying a user id

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Why a token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "signature mismatch"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}

/// JWT Handler for token operations. Holds the process-wide signing secret.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with the default 24h lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for a user id, valid from now
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    /// Issuance is truncated to whole seconds; expiry is exactly `ttl` later.
    pub fn issue_at(&self, user_id: i64, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl.num_seconds())
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp,
        };

        debug!(user_id, exp, "Issuing JWT");

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Verify a token and return the embedded user id
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    /// Fails at or after the embedded expiry, with no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared below against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;

        if now.timestamp() >= decoded.claims.exp {
            return Err(TokenError::Expired);
        }

        decoded
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed)
    }
}
