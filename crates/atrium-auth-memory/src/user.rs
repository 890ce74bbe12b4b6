//! DashMap-backed user storage.

use async_trait::async_trait;
use atrium_auth::error::{AuthError, AuthResult};
use atrium_auth::storage::{User, UserStorage};
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory [`UserStorage`].
#[derive(Default)]
pub struct MemoryUserStorage {
    users: DashMap<Uuid, User>,
}

impl MemoryUserStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find_one<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

fn in_tenant(user: &User, tenant_id: Option<Uuid>) -> bool {
    match tenant_id {
        Some(t) => user.tenant_id == Some(t),
        None => true,
    }
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(
        &self,
        email: &str,
        tenant_id: Option<Uuid>,
    ) -> AuthResult<Option<User>> {
        Ok(self.find_one(|user| {
            user.email.eq_ignore_ascii_case(email) && in_tenant(user, tenant_id)
        }))
    }

    async fn find_by_username(
        &self,
        username: &str,
        tenant_id: Option<Uuid>,
    ) -> AuthResult<Option<User>> {
        Ok(self.find_one(|user| user.username == username && in_tenant(user, tenant_id)))
    }

    async fn find_superuser(&self) -> AuthResult<Option<User>> {
        // Only the platform superuser exists outside a tenant.
        Ok(self.find_one(|user| user.tenant_id.is_none()))
    }

    async fn count_by_role(&self, role_id: Uuid) -> AuthResult<u64> {
        Ok(self
            .users
            .iter()
            .filter(|entry| entry.value().role_id == role_id)
            .count() as u64)
    }

    async fn create(&self, user: &User) -> AuthResult<()> {
        if self.users.contains_key(&user.id) {
            return Err(AuthError::storage("user id already exists"));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        match self.users.get_mut(&user.id) {
            Some(mut entry) => {
                *entry = user.clone();
                Ok(())
            }
            None => Err(AuthError::storage("user does not exist")),
        }
    }

    async fn delete(&self, id: Uuid) -> AuthResult<bool> {
        Ok(self.users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(tenant_id: Option<Uuid>, username: &str, email: &str) -> User {
        let mut builder = User::builder("Test", username, email, "hash", Uuid::new_v4());
        if let Some(t) = tenant_id {
            builder = builder.tenant_id(t);
        }
        builder.build()
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive_and_tenant_scoped() {
        let store = MemoryUserStorage::new();
        let tenant = Uuid::new_v4();
        let u = user(Some(tenant), "ada", "Ada@Example.com");
        store.create(&u).await.unwrap();

        let found = store
            .find_by_email("ada@example.com", Some(tenant))
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, u.id);

        let other_tenant = store
            .find_by_email("ada@example.com", Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(other_tenant.is_none());

        // Unscoped search spans tenants.
        let unscoped = store.find_by_email("ada@example.com", None).await.unwrap();
        assert!(unscoped.is_some());
    }

    #[tokio::test]
    async fn test_find_superuser() {
        let store = MemoryUserStorage::new();
        store
            .create(&user(Some(Uuid::new_v4()), "tenant-user", "t@example.com"))
            .await
            .unwrap();
        assert!(store.find_superuser().await.unwrap().is_none());

        let root = user(None, "root", "root@example.com");
        store.create(&root).await.unwrap();
        assert_eq!(store.find_superuser().await.unwrap().unwrap().id, root.id);
    }

    #[tokio::test]
    async fn test_count_by_role() {
        let store = MemoryUserStorage::new();
        let role_id = Uuid::new_v4();
        let mut a = user(None, "a", "a@example.com");
        a.role_id = role_id;
        let mut b = user(Some(Uuid::new_v4()), "b", "b@example.com");
        b.role_id = role_id;
        store.create(&a).await.unwrap();
        store.create(&b).await.unwrap();

        assert_eq!(store.count_by_role(role_id).await.unwrap(), 2);
        assert_eq!(store.count_by_role(Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_requires_existing_user() {
        let store = MemoryUserStorage::new();
        let u = user(None, "ghost", "g@example.com");
        assert!(store.update(&u).await.is_err());
    }
}
