//! Cache abstraction and the cache-aside lookup layer.
//!
//! The cache is an optimization, never the source of truth. A cache miss
//! always falls through to storage; only storage decides whether an entity
//! exists. Entries are JSON strings so any string-valued key-value store
//! (in-memory map, Redis) can back the trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::error::{AuthError, AuthResult};
use crate::storage::{Role, RoleStorage, User, UserStorage};

/// Which token class a blacklist entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived access token.
    Access,
    /// Long-lived refresh token.
    Refresh,
}

impl TokenKind {
    /// The key segment for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access-token",
            Self::Refresh => "refresh-token",
        }
    }
}

/// Cache key for a user record.
#[must_use]
pub fn user_key(id: Uuid) -> String {
    format!("user:{id}")
}

/// Cache key for a role record.
#[must_use]
pub fn role_key(id: Uuid) -> String {
    format!("role:{id}")
}

/// Cache key for a blacklisted token.
#[must_use]
pub fn blacklist_key(kind: TokenKind, token: &str) -> String {
    format!("blacklist:{}:{token}", kind.as_str())
}

/// Marker value stored under blacklist keys. Only key presence matters.
pub const BLACKLIST_MARKER: &str = "1";

/// A shared key-value cache with per-entry TTLs.
///
/// All operations are atomic with respect to a single key. Implementations
/// must expire entries no later than their TTL; lazy expiry on read is
/// acceptable.
#[async_trait]
pub trait AuthCache: Send + Sync {
    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;

    /// Removes the entry under `key`, if present.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}

/// Cache-aside wrapper over user and role storage.
///
/// Read paths consult the cache first and fall through to storage on miss,
/// writing the fresh record back with the configured TTL. Mutation paths
/// call the `invalidate_*` methods so stale entries never outlive a change
/// by more than one request.
pub struct LookupCache {
    cache: Arc<dyn AuthCache>,
    users: Arc<dyn UserStorage>,
    roles: Arc<dyn RoleStorage>,
    config: CacheConfig,
}

impl LookupCache {
    /// Creates a new lookup cache over the given backends.
    pub fn new(
        cache: Arc<dyn AuthCache>,
        users: Arc<dyn UserStorage>,
        roles: Arc<dyn RoleStorage>,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache,
            users,
            roles,
            config,
        }
    }

    /// Looks up a user, cache first.
    pub async fn get_user(&self, id: Uuid) -> AuthResult<Option<User>> {
        let key = user_key(id);
        if let Some(cached) = self.cache.get(&key).await? {
            match serde_json::from_str::<User>(&cached) {
                Ok(user) => {
                    debug!(user_id = %id, "user cache hit");
                    return Ok(Some(user));
                }
                Err(error) => {
                    // Corrupt entry; drop it and fall through to storage.
                    warn!(user_id = %id, %error, "discarding undecodable user cache entry");
                    self.cache.delete(&key).await?;
                }
            }
        }

        let Some(user) = self.users.find_by_id(id).await? else {
            return Ok(None);
        };
        self.store_user(&user).await?;
        Ok(Some(user))
    }

    /// Looks up a role, cache first.
    pub async fn get_role(&self, id: Uuid) -> AuthResult<Option<Role>> {
        let key = role_key(id);
        if let Some(cached) = self.cache.get(&key).await? {
            match serde_json::from_str::<Role>(&cached) {
                Ok(role) => {
                    debug!(role_id = %id, "role cache hit");
                    return Ok(Some(role));
                }
                Err(error) => {
                    warn!(role_id = %id, %error, "discarding undecodable role cache entry");
                    self.cache.delete(&key).await?;
                }
            }
        }

        let Some(role) = self.roles.find_by_id(id).await? else {
            return Ok(None);
        };
        self.store_role(&role).await?;
        Ok(Some(role))
    }

    /// Drops the cached user and, when the caller has the fresh record,
    /// re-seeds it immediately.
    pub async fn invalidate_user(&self, id: Uuid, fresh: Option<&User>) -> AuthResult<()> {
        self.cache.delete(&user_key(id)).await?;
        if let Some(user) = fresh {
            self.store_user(user).await?;
        }
        Ok(())
    }

    /// Drops the cached role and, when the caller has the fresh record,
    /// re-seeds it immediately.
    pub async fn invalidate_role(&self, id: Uuid, fresh: Option<&Role>) -> AuthResult<()> {
        self.cache.delete(&role_key(id)).await?;
        if let Some(role) = fresh {
            self.store_role(role).await?;
        }
        Ok(())
    }

    async fn store_user(&self, user: &User) -> AuthResult<()> {
        let value = serde_json::to_string(user)
            .map_err(|e| AuthError::internal(format!("failed to encode user for cache: {e}")))?;
        self.cache
            .set(&user_key(user.id), &value, self.config.user_ttl)
            .await
    }

    async fn store_role(&self, role: &Role) -> AuthResult<()> {
        let value = serde_json::to_string(role)
            .map_err(|e| AuthError::internal(format!("failed to encode role for cache: {e}")))?;
        self.cache
            .set(&role_key(role.id), &value, self.config.role_ttl)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let id = Uuid::nil();
        assert_eq!(
            user_key(id),
            "user:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            role_key(id),
            "role:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_blacklist_key_formats() {
        assert_eq!(
            blacklist_key(TokenKind::Access, "abc.def.ghi"),
            "blacklist:access-token:abc.def.ghi"
        );
        assert_eq!(
            blacklist_key(TokenKind::Refresh, "abc.def.ghi"),
            "blacklist:refresh-token:abc.def.ghi"
        );
    }
}
