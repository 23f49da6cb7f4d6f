//! Session tokens - Issues and verifies signed, time-limited bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the username, role and expiry. Nothing is
//! persisted: verification is signature + expiry only, and logout is the
//! client discarding its token.

use crate::{
    entities::Role,
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Role at the time of issuance
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Signs and verifies session tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service that signs with `secret` and issues tokens valid for `ttl`.
    #[must_use]
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Default lifetime of tokens from [`Self::issue`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `username` with the configured lifetime.
    pub fn issue(&self, username: &str, role: Role) -> Result<String> {
        self.issue_with_ttl(username, role, self.ttl)
    }

    /// Issues a token for `username` expiring `ttl` from now.
    pub fn issue_with_ttl(&self, username: &str, role: Role, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(Into::into)
    }

    /// Verifies signature, algorithm and expiry and returns the claims.
    ///
    /// Every failure collapses into [`Error::Unauthorized`]; the cause is only
    /// logged.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                Error::Unauthorized
            })
    }
}
