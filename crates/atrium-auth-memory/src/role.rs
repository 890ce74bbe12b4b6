//! DashMap-backed role storage.

use async_trait::async_trait;
use atrium_auth::error::{AuthError, AuthResult};
use atrium_auth::storage::{Role, RoleStorage};
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory [`RoleStorage`].
#[derive(Default)]
pub struct MemoryRoleStorage {
    roles: DashMap<Uuid, Role>,
}

impl MemoryRoleStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStorage for MemoryRoleStorage {
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Role>> {
        Ok(self.roles.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_name(
        &self,
        name: &str,
        tenant_id: Option<Uuid>,
    ) -> AuthResult<Option<Role>> {
        Ok(self
            .roles
            .iter()
            .find(|entry| {
                let role = entry.value();
                role.name.eq_ignore_ascii_case(name) && role.tenant_id == tenant_id
            })
            .map(|entry| entry.value().clone()))
    }

    async fn list(
        &self,
        tenant_id: Option<Uuid>,
        limit: usize,
        offset: usize,
    ) -> AuthResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .iter()
            .filter(|entry| match tenant_id {
                Some(t) => entry.value().tenant_id == Some(t),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        // Deterministic order for paging.
        roles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(roles.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, tenant_id: Option<Uuid>) -> AuthResult<u64> {
        Ok(self
            .roles
            .iter()
            .filter(|entry| match tenant_id {
                Some(t) => entry.value().tenant_id == Some(t),
                None => true,
            })
            .count() as u64)
    }

    async fn create(&self, role: &Role) -> AuthResult<()> {
        if self.roles.contains_key(&role.id) {
            return Err(AuthError::storage("role id already exists"));
        }
        self.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn create_many(&self, roles: &[Role]) -> AuthResult<()> {
        for role in roles {
            self.create(role).await?;
        }
        Ok(())
    }

    async fn update(&self, role: &Role) -> AuthResult<()> {
        match self.roles.get_mut(&role.id) {
            Some(mut entry) => {
                *entry = role.clone();
                Ok(())
            }
            None => Err(AuthError::storage("role does not exist")),
        }
    }

    async fn delete(&self, id: Uuid) -> AuthResult<bool> {
        Ok(self.roles.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_auth::Permission;

    #[tokio::test]
    async fn test_find_by_name_distinguishes_tenants() {
        let store = MemoryRoleStorage::new();
        let tenant = Uuid::new_v4();
        let platform = Role::builder("auditor").build();
        let scoped = Role::builder("auditor").tenant_id(tenant).build();
        store.create(&platform).await.unwrap();
        store.create(&scoped).await.unwrap();

        let found = store.find_by_name("auditor", None).await.unwrap().unwrap();
        assert_eq!(found.id, platform.id);

        let found = store
            .find_by_name("AUDITOR", Some(tenant))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, scoped.id);
    }

    #[tokio::test]
    async fn test_list_scoping_and_paging() {
        let store = MemoryRoleStorage::new();
        let tenant = Uuid::new_v4();
        for name in ["a", "b", "c"] {
            store
                .create(
                    &Role::builder(name)
                        .permissions(vec![Permission::DashboardView])
                        .tenant_id(tenant)
                        .build(),
                )
                .await
                .unwrap();
        }
        store.create(&Role::builder("other").build()).await.unwrap();

        let all = store.list(None, 100, 0).await.unwrap();
        assert_eq!(all.len(), 4);

        let scoped = store.list(Some(tenant), 100, 0).await.unwrap();
        assert_eq!(scoped.len(), 3);

        let page = store.list(Some(tenant), 2, 1).await.unwrap();
        assert_eq!(page.len(), 2);

        assert_eq!(store.count(Some(tenant)).await.unwrap(), 3);
    }
}
