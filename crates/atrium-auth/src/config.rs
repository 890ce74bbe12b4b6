//! Configuration types for the auth subsystem.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::permissions::Permission;

/// Top-level auth configuration, nested under `[auth]` in server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT signing and lifetime settings.
    pub jwt: JwtConfig,

    /// Permissions granted when a role carries none of its own.
    ///
    /// Also consulted by the guard to decide whether a nominally public
    /// route is actually permission-gated.
    pub default_permissions: Vec<Permission>,

    /// Cache TTL settings for the lookup layer.
    pub cache: CacheConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            default_permissions: vec![Permission::DashboardView],
            cache: CacheConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration, returning a description of the first
    /// problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}

/// JWT signing and lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HS256 signing secret. Must be set to a non-empty value in any real
    /// deployment; the default exists for tests only.
    pub secret: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,

    /// Refresh token lifetime, measured from issuance.
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,

    /// Whether a consumed refresh token is blacklisted when a new pair is
    /// issued for it. Disabling leaves rotated refresh tokens usable until
    /// natural expiry.
    pub rotate_refresh_tokens: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_ttl: Duration::from_secs(60 * 60),
            refresh_token_ttl: Duration::from_secs(24 * 60 * 60),
            rotate_refresh_tokens: true,
        }
    }
}

impl JwtConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::new("jwt.secret must not be empty"));
        }
        if self.access_token_ttl.is_zero() {
            return Err(ConfigError::new("jwt.access_token_ttl must be positive"));
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(ConfigError::new(
                "jwt.refresh_token_ttl must exceed jwt.access_token_ttl",
            ));
        }
        Ok(())
    }
}

/// Cache TTL settings for the lookup layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for cached user records.
    #[serde(with = "humantime_serde")]
    pub user_ttl: Duration,

    /// TTL for cached role records.
    #[serde(with = "humantime_serde")]
    pub role_ttl: Duration,

    /// Minimum TTL applied to blacklist entries, covering clock skew for
    /// tokens already at or past expiry when revoked.
    #[serde(with = "humantime_serde")]
    pub blacklist_floor: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_ttl: Duration::from_secs(24 * 60 * 60),
            role_ttl: Duration::from_secs(60 * 60),
            blacklist_floor: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.blacklist_floor.is_zero() {
            return Err(ConfigError::new("cache.blacklist_floor must be positive"));
        }
        Ok(())
    }
}

/// Configuration validation error.
#[derive(Debug, thiserror::Error)]
#[error("Invalid auth configuration: {message}")]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
