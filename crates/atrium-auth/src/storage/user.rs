//! User entity and storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthResult;
use crate::storage::role::Role;

/// A user account.
///
/// Serializes full-shape so cache entries round-trip to records behaviorally
/// identical to fresh storage reads. Use [`User::sanitized`] before exposing
/// a record through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant. `None` only for the platform superuser.
    pub tenant_id: Option<Uuid>,
    /// Display name.
    pub full_name: String,
    /// Login username, unique within the tenant.
    pub username: String,
    /// Login email, unique within the tenant.
    pub email: String,
    /// Argon2 password hash. Empty after [`User::sanitized`].
    pub password_hash: String,
    /// Assigned role.
    pub role_id: Uuid,
    /// Eagerly loaded role, when the backend provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Optional profile photo reference (object storage is external).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_id: Option<Uuid>,
    /// Whether the account may authenticate.
    pub active: bool,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Creates a builder for a new user.
    #[must_use]
    pub fn builder(
        full_name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role_id: Uuid,
    ) -> UserBuilder {
        UserBuilder {
            tenant_id: None,
            full_name: full_name.into(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role_id,
            profile_photo_id: None,
            active: true,
        }
    }

    /// Returns a copy safe for API exposure, with the password hash removed.
    #[must_use]
    pub fn sanitized(&self) -> User {
        User {
            password_hash: String::new(),
            ..self.clone()
        }
    }
}

/// Builder for [`User`].
#[derive(Debug)]
pub struct UserBuilder {
    tenant_id: Option<Uuid>,
    full_name: String,
    username: String,
    email: String,
    password_hash: String,
    role_id: Uuid,
    profile_photo_id: Option<Uuid>,
    active: bool,
}

impl UserBuilder {
    /// Binds the user to a tenant.
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the profile photo reference.
    #[must_use]
    pub fn profile_photo_id(mut self, id: Uuid) -> Self {
        self.profile_photo_id = Some(id);
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builds the user with a fresh id and timestamps.
    #[must_use]
    pub fn build(self) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            tenant_id: self.tenant_id,
            full_name: self.full_name,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role_id: self.role_id,
            role: None,
            profile_photo_id: self.profile_photo_id,
            active: self.active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage operations for users.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds a user by id.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Finds a user by email, optionally scoped to a tenant.
    async fn find_by_email(&self, email: &str, tenant_id: Option<Uuid>)
    -> AuthResult<Option<User>>;

    /// Finds a user by username, optionally scoped to a tenant.
    async fn find_by_username(
        &self,
        username: &str,
        tenant_id: Option<Uuid>,
    ) -> AuthResult<Option<User>>;

    /// Finds the platform superuser, if one exists.
    async fn find_superuser(&self) -> AuthResult<Option<User>>;

    /// Counts users currently assigned a role.
    async fn count_by_role(&self, role_id: Uuid) -> AuthResult<u64>;

    /// Persists a new user.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Persists changes to an existing user.
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Deletes a user by id. Returns `false` if the user did not exist.
    async fn delete(&self, id: Uuid) -> AuthResult<bool>;
}
