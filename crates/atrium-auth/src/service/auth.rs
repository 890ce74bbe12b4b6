//! Tenant self-registration.

use std::sync::Arc;

use tracing::info;

use crate::error::{AuthError, AuthResult};
use crate::password::hash_password;
use crate::service::role::default_tenant_roles;
use crate::storage::role::RoleStorage;
use crate::storage::tenant::{Tenant, TenantStorage};
use crate::storage::user::{User, UserStorage};

/// Input for tenant self-registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Name of the new organization.
    pub tenant_name: String,
    /// Display name of the tenant administrator.
    pub full_name: String,
    /// Administrator username.
    pub username: String,
    /// Administrator email.
    pub email: String,
    /// Administrator password.
    pub password: String,
}

/// Registration service: creates a tenant, seeds its default roles, and
/// creates the tenant administrator account.
pub struct AuthService {
    tenants: Arc<dyn TenantStorage>,
    roles: Arc<dyn RoleStorage>,
    users: Arc<dyn UserStorage>,
}

impl AuthService {
    /// Creates a new registration service.
    pub fn new(
        tenants: Arc<dyn TenantStorage>,
        roles: Arc<dyn RoleStorage>,
        users: Arc<dyn UserStorage>,
    ) -> Self {
        Self {
            tenants,
            roles,
            users,
        }
    }

    /// Registers a new tenant with its administrator account.
    ///
    /// The email and username must be free across all tenants; login
    /// resolves identifiers without a tenant scope, so a duplicate anywhere
    /// would make the new account ambiguous.
    pub async fn register(&self, input: Registration) -> AuthResult<(Tenant, User)> {
        if self
            .users
            .find_by_email(&input.email, None)
            .await?
            .is_some()
        {
            return Err(AuthError::invalid_request("email is already in use"));
        }
        if self
            .users
            .find_by_username(&input.username, None)
            .await?
            .is_some()
        {
            return Err(AuthError::invalid_request("username is already in use"));
        }

        let tenant = Tenant::new(&input.tenant_name);
        self.tenants.create(&tenant).await?;

        let roles = default_tenant_roles(tenant.id);
        self.roles.create_many(&roles).await?;
        // Seeding order puts the tenant-admin role first.
        let admin_role_id = roles[0].id;

        let password_hash = hash_password(&input.password)?;
        let admin = User::builder(
            input.full_name,
            input.username,
            input.email,
            password_hash,
            admin_role_id,
        )
        .tenant_id(tenant.id)
        .build();
        self.users.create(&admin).await?;

        info!(tenant_id = %tenant.id, admin_id = %admin.id, "tenant registered");
        Ok((tenant, admin))
    }
}
