//! DashMap-backed tenant storage.

use async_trait::async_trait;
use atrium_auth::error::{AuthError, AuthResult};
use atrium_auth::storage::{Tenant, TenantStorage};
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory [`TenantStorage`].
#[derive(Default)]
pub struct MemoryTenantStorage {
    tenants: DashMap<Uuid, Tenant>,
}

impl MemoryTenantStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantStorage for MemoryTenantStorage {
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Tenant>> {
        Ok(self.tenants.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, tenant: &Tenant) -> AuthResult<()> {
        if self.tenants.contains_key(&tenant.id) {
            return Err(AuthError::storage("tenant id already exists"));
        }
        self.tenants.insert(tenant.id, tenant.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryTenantStorage::new();
        let tenant = Tenant::new("Acme");
        store.create(&tenant).await.unwrap();

        let found = store.find_by_id(tenant.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Acme");
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
