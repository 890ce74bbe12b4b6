//! Token lifecycle service: login, refresh, logout, revocation checks.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{AuthCache, BLACKLIST_MARKER, TokenKind, blacklist_key};
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password::verify_password;
use crate::storage::UserStorage;
use crate::token::jwt::{JwtService, TokenClaims};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Shape check only; deliverability is not our concern.
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Login credentials. Ephemeral; never stored or logged.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Email address or username.
    pub identifier: String,
    /// Plaintext password.
    pub password: String,
}

impl Credential {
    /// Whether the identifier looks like an email address.
    #[must_use]
    pub fn is_email(&self) -> bool {
        EMAIL_RE.is_match(&self.identifier)
    }
}

/// An issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Refresh token, usable only after the access token expires.
    pub refresh_token: String,
    /// Subject of both tokens.
    pub user_id: Uuid,
}

/// Manages the token lifecycle against user storage and the shared cache.
pub struct TokenService {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserStorage>,
    cache: Arc<dyn AuthCache>,
    config: AuthConfig,
}

impl TokenService {
    /// Creates a new token service.
    pub fn new(
        jwt: Arc<JwtService>,
        users: Arc<dyn UserStorage>,
        cache: Arc<dyn AuthCache>,
        config: AuthConfig,
    ) -> Self {
        Self {
            jwt,
            users,
            cache,
            config,
        }
    }

    /// Authenticates a credential and issues a fresh token pair.
    ///
    /// Every failure mode surfaces the same generic message; the caller
    /// learns nothing about which part of the credential was wrong.
    pub async fn login(&self, credential: &Credential) -> AuthResult<TokenPair> {
        let user = if credential.is_email() {
            self.users.find_by_email(&credential.identifier, None).await?
        } else {
            self.users
                .find_by_username(&credential.identifier, None)
                .await?
        };

        let Some(user) = user else {
            debug!("login rejected: unknown identifier");
            return Err(AuthError::unauthenticated("invalid identifier or password"));
        };

        if !verify_password(&credential.password, &user.password_hash)? {
            debug!(user_id = %user.id, "login rejected: password mismatch");
            return Err(AuthError::unauthenticated("invalid identifier or password"));
        }

        let pair = self.issue_pair(user.id)?;
        info!(user_id = %user.id, "login succeeded");
        Ok(pair)
    }

    /// Exchanges a refresh token for a fresh pair.
    ///
    /// Order matters: revocation is checked before any cryptographic work,
    /// and the subject is resolved only after the token itself is valid.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        if self.is_revoked(TokenKind::Refresh, refresh_token).await? {
            debug!("refresh rejected: token revoked");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.jwt.decode(refresh_token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AuthError::not_found("user not found"))?;

        if self.config.jwt.rotate_refresh_tokens {
            self.blacklist(TokenKind::Refresh, refresh_token, &claims)
                .await?;
        }

        let pair = self.issue_pair(user.id)?;
        debug!(user_id = %user.id, "refresh token exchanged");
        Ok(pair)
    }

    /// Revokes both tokens of a session.
    ///
    /// Expired or not-yet-valid tokens are still accepted; only the
    /// signature must check out. Any decode failure collapses into a single
    /// generic error so token internals never leak.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> AuthResult<()> {
        let (access_claims, refresh_claims) = match (
            self.jwt.decode_unchecked(access_token),
            self.jwt.decode_unchecked(refresh_token),
        ) {
            (Ok(a), Ok(r)) => (a, r),
            _ => return Err(AuthError::invalid_request("failed to blacklist token")),
        };

        self.blacklist(TokenKind::Access, access_token, &access_claims)
            .await?;
        self.blacklist(TokenKind::Refresh, refresh_token, &refresh_claims)
            .await?;

        info!(user_id = %access_claims.sub, "session revoked");
        Ok(())
    }

    /// Whether a token has been revoked. O(1) cache lookup, no decoding.
    pub async fn is_revoked(&self, kind: TokenKind, token: &str) -> AuthResult<bool> {
        Ok(self
            .cache
            .get(&blacklist_key(kind, token))
            .await?
            .is_some())
    }

    async fn blacklist(
        &self,
        kind: TokenKind,
        token: &str,
        claims: &TokenClaims,
    ) -> AuthResult<()> {
        let remaining = claims.remaining_ms(OffsetDateTime::now_utc());
        let ttl = blacklist_ttl(remaining, self.config.cache.blacklist_floor);
        self.cache
            .set(&blacklist_key(kind, token), BLACKLIST_MARKER, ttl)
            .await
    }

    fn issue_pair(&self, user_id: Uuid) -> AuthResult<TokenPair> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let access_exp = now + self.config.jwt.access_token_ttl.as_secs() as i64;
        let refresh_exp = now + self.config.jwt.refresh_token_ttl.as_secs() as i64;

        let access_token = self.jwt.encode(&TokenClaims {
            sub: user_id,
            iat: now,
            exp: access_exp,
            nbf: None,
        })?;
        // The refresh token only becomes usable once the access token dies.
        let refresh_token = self.jwt.encode(&TokenClaims {
            sub: user_id,
            iat: now,
            exp: refresh_exp,
            nbf: Some(access_exp),
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            user_id,
        })
    }
}

/// Blacklist TTL: the token's remaining life, floored so a token revoked at
/// or past expiry still gets a short entry covering clock skew.
fn blacklist_ttl(remaining_ms: u64, floor: Duration) -> Duration {
    Duration::from_millis(remaining_ms).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_detection() {
        let cred = |identifier: &str| Credential {
            identifier: identifier.to_string(),
            password: String::new(),
        };

        assert!(cred("ada@example.com").is_email());
        assert!(cred("a.b+tag@sub.example.co").is_email());
        assert!(!cred("ada").is_email());
        assert!(!cred("ada@nodot").is_email());
        assert!(!cred("has space@example.com").is_email());
    }

    #[test]
    fn test_blacklist_ttl_floor() {
        let floor = Duration::from_secs(60);

        // Plenty of life left: use the remaining life.
        assert_eq!(
            blacklist_ttl(3_600_000, floor),
            Duration::from_millis(3_600_000)
        );
        // Nearly or fully expired: use the floor.
        assert_eq!(blacklist_ttl(1_000, floor), floor);
        assert_eq!(blacklist_ttl(0, floor), floor);
    }
}
