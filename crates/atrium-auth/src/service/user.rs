//! User management with tenant isolation and self-action protection.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::LookupCache;
use crate::context::RequestScope;
use crate::error::{AuthError, AuthResult};
use crate::password::hash_password;
use crate::service::role::superadmin_permissions;
use crate::storage::role::{Role, RoleStorage, SUPERADMIN_ROLE};
use crate::storage::user::{User, UserStorage};

/// Input for user creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub full_name: String,
    /// Login username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before persistence.
    pub password: String,
    /// Role to assign.
    pub role_id: Uuid,
}

/// Input for user updates. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name.
    pub full_name: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New password, hashed before persistence.
    pub password: Option<String>,
    /// New profile photo reference.
    pub profile_photo_id: Option<Uuid>,
}

/// Input for the one-time superuser bootstrap.
#[derive(Debug, Clone)]
pub struct NewSuperuser {
    /// Display name.
    pub full_name: String,
    /// Login username.
    pub username: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// User management service.
pub struct UserService {
    users: Arc<dyn UserStorage>,
    roles: Arc<dyn RoleStorage>,
    lookup: Arc<LookupCache>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStorage>,
        roles: Arc<dyn RoleStorage>,
        lookup: Arc<LookupCache>,
    ) -> Self {
        Self {
            users,
            roles,
            lookup,
        }
    }

    /// Fetches a user visible to the given scope.
    pub async fn get_by_id(&self, scope: &RequestScope, id: Uuid) -> AuthResult<User> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::not_found("user not found"))?;
        self.check_tenant(scope, user.tenant_id)?;
        Ok(user)
    }

    /// Creates a user in the scope's tenant.
    pub async fn create(&self, scope: &RequestScope, input: NewUser) -> AuthResult<User> {
        let role = self
            .roles
            .find_by_id(input.role_id)
            .await?
            .ok_or_else(|| AuthError::invalid_request("invalid role reference"))?;

        if role.is_superadmin() && !scope.is_superuser() {
            return Err(AuthError::forbidden(
                "only a superuser may assign the superadmin role",
            ));
        }

        let tenant_id = scope.tenant_id().ok_or_else(|| {
            AuthError::invalid_request("a tenant context is required to create a user")
        })?;
        if role.tenant_id != Some(tenant_id) && !role.is_superadmin() {
            return Err(AuthError::forbidden("role belongs to another tenant"));
        }

        self.check_unique(&input.email, &input.username, Some(tenant_id))
            .await?;

        let password_hash = hash_password(&input.password)?;
        let user = User::builder(
            input.full_name,
            input.username,
            input.email,
            password_hash,
            role.id,
        )
        .tenant_id(tenant_id)
        .build();

        self.users.create(&user).await?;
        info!(user_id = %user.id, %tenant_id, "user created");
        Ok(user)
    }

    /// Updates a user's profile fields.
    pub async fn update(
        &self,
        scope: &RequestScope,
        id: Uuid,
        changes: UpdateUser,
    ) -> AuthResult<User> {
        let mut user = self.get_by_id(scope, id).await?;

        if let Some(email) = &changes.email
            && email != &user.email
            && self
                .users
                .find_by_email(email, user.tenant_id)
                .await?
                .is_some()
        {
            return Err(AuthError::invalid_request("email is already in use"));
        }
        if let Some(username) = &changes.username
            && username != &user.username
            && self
                .users
                .find_by_username(username, user.tenant_id)
                .await?
                .is_some()
        {
            return Err(AuthError::invalid_request("username is already in use"));
        }

        if let Some(full_name) = changes.full_name {
            user.full_name = full_name;
        }
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password) = changes.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(photo_id) = changes.profile_photo_id {
            user.profile_photo_id = Some(photo_id);
        }
        user.updated_at = time::OffsetDateTime::now_utc();

        self.users.update(&user).await?;
        self.lookup.invalidate_user(user.id, Some(&user)).await?;
        debug!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Reassigns a user's role.
    pub async fn change_role(
        &self,
        scope: &RequestScope,
        user_id: Uuid,
        role_id: Uuid,
    ) -> AuthResult<User> {
        if user_id == scope.user_id() {
            return Err(AuthError::forbidden("cannot change your own role"));
        }

        let mut user = self.get_by_id(scope, user_id).await?;
        let role = self
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AuthError::invalid_request("invalid role reference"))?;

        if role.is_superadmin() && !scope.is_superuser() {
            return Err(AuthError::forbidden(
                "only a superuser may assign the superadmin role",
            ));
        }
        if !role.is_superadmin() && role.tenant_id != user.tenant_id {
            return Err(AuthError::forbidden("role belongs to another tenant"));
        }

        user.role_id = role.id;
        user.role = None;
        user.updated_at = time::OffsetDateTime::now_utc();

        self.users.update(&user).await?;
        self.lookup.invalidate_user(user.id, Some(&user)).await?;
        info!(user_id = %user.id, role_id = %role.id, "user role changed");
        Ok(user)
    }

    /// Flips a user's active flag.
    pub async fn toggle_status(&self, scope: &RequestScope, user_id: Uuid) -> AuthResult<User> {
        if user_id == scope.user_id() {
            return Err(AuthError::forbidden("cannot change your own status"));
        }

        let mut user = self.get_by_id(scope, user_id).await?;
        user.active = !user.active;
        user.updated_at = time::OffsetDateTime::now_utc();

        self.users.update(&user).await?;
        self.lookup.invalidate_user(user.id, Some(&user)).await?;
        info!(user_id = %user.id, active = user.active, "user status toggled");
        Ok(user)
    }

    /// Deletes a user.
    pub async fn delete(&self, scope: &RequestScope, user_id: Uuid) -> AuthResult<()> {
        if user_id == scope.user_id() && scope.is_superuser() {
            return Err(AuthError::forbidden(
                "the superuser account cannot delete itself",
            ));
        }

        let user = self.get_by_id(scope, user_id).await?;
        self.users.delete(user.id).await?;
        self.lookup.invalidate_user(user.id, None).await?;
        info!(user_id = %user.id, "user deleted");
        Ok(())
    }

    /// One-time bootstrap of the platform superuser.
    ///
    /// Creates the superadmin role if it does not exist yet. Fails once a
    /// superuser account is present; it does not matter who asks.
    pub async fn setup_superuser(&self, input: NewSuperuser) -> AuthResult<User> {
        if self.users.find_superuser().await?.is_some() {
            return Err(AuthError::invalid_request("a superuser already exists"));
        }

        let role = match self.roles.find_by_name(SUPERADMIN_ROLE, None).await? {
            Some(role) => role,
            None => {
                let role = Role::builder(SUPERADMIN_ROLE)
                    .description("Platform owner managing all tenants and system operations")
                    .permissions(superadmin_permissions())
                    .system()
                    .build();
                self.roles.create(&role).await?;
                role
            }
        };

        let password_hash = hash_password(&input.password)?;
        let user = User::builder(
            input.full_name,
            input.username,
            input.email,
            password_hash,
            role.id,
        )
        .build();

        self.users.create(&user).await?;
        info!(user_id = %user.id, "superuser bootstrapped");
        Ok(user)
    }

    async fn check_unique(
        &self,
        email: &str,
        username: &str,
        tenant_id: Option<Uuid>,
    ) -> AuthResult<()> {
        if self.users.find_by_email(email, tenant_id).await?.is_some() {
            return Err(AuthError::invalid_request("email is already in use"));
        }
        if self
            .users
            .find_by_username(username, tenant_id)
            .await?
            .is_some()
        {
            return Err(AuthError::invalid_request("username is already in use"));
        }
        Ok(())
    }

    fn check_tenant(&self, scope: &RequestScope, tenant_id: Option<Uuid>) -> AuthResult<()> {
        if scope.can_access_tenant(tenant_id) {
            Ok(())
        } else {
            debug!(actor = %scope.user_id(), "tenant isolation violation on user access");
            Err(AuthError::forbidden("access denied for tenant"))
        }
    }
}
