//! JWT encoding and decoding.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Claims carried by both access and refresh tokens.
///
/// Access tokens omit `nbf`. Refresh tokens set `nbf` to the paired access
/// token's expiry so the two lifetimes never overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id.
    pub sub: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Not-before, seconds since the epoch. Refresh tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl TokenClaims {
    /// Remaining lifetime in milliseconds relative to `now`, zero if the
    /// token is already expired.
    #[must_use]
    pub fn remaining_ms(&self, now: OffsetDateTime) -> u64 {
        let remaining = self.exp * 1000 - (now.unix_timestamp_nanos() / 1_000_000) as i64;
        remaining.max(0) as u64
    }
}

/// HS256 JWT encoder/decoder over a shared signing secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs the claims into a compact JWT.
    pub fn encode(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("failed to sign token: {e}")))
    }

    /// Verifies signature, expiry, and (when present) not-before.
    ///
    /// No leeway is applied: a refresh token becomes usable exactly when its
    /// paired access token expires, not a clock-skew window earlier.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        match decode::<TokenClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(error) => Err(match error.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::unauthenticated("invalid token"),
            }),
        }
    }

    /// Verifies the signature only, accepting expired and not-yet-valid
    /// tokens. Used by logout, which must be able to blacklist a token in
    /// any lifecycle state as long as we issued it.
    pub fn decode_unchecked(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::unauthenticated("invalid token"))
    }
}
