//! DashMap-backed cache with per-entry TTLs.

use std::time::Duration;

use async_trait::async_trait;
use atrium_auth::cache::AuthCache;
use atrium_auth::error::AuthResult;
use dashmap::DashMap;
use time::OffsetDateTime;

struct Entry {
    value: String,
    deadline: OffsetDateTime,
}

/// In-memory [`AuthCache`] with lazy expiry: entries past their deadline are
/// dropped on the read that finds them.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AuthCache for MemoryCache {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let now = OffsetDateTime::now_utc();
        if let Some(entry) = self.entries.get(key) {
            if entry.deadline > now {
                return Ok(Some(entry.value.clone()));
            }
        } else {
            return Ok(None);
        }
        // Expired. Re-check under the removal to avoid racing a fresh set.
        self.entries.remove_if(key, |_, entry| entry.deadline <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: OffsetDateTime::now_utc() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_set_replaces_value_and_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "old", Duration::ZERO).await.unwrap();
        cache
            .set("k", "new", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
