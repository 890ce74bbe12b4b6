//! Role entity and storage trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthResult;
use crate::permissions::Permission;

/// Name of the reserved platform-wide superuser role.
pub const SUPERADMIN_ROLE: &str = "superadmin";

/// Name of the tenant administrator role seeded for each new tenant.
pub const TENANT_ADMIN_ROLE: &str = "admin_tenant";

/// A role binding a set of permissions, scoped to a tenant or platform-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,
    /// Role name, unique within its tenant.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Granted permissions. A role with an empty set falls back to the
    /// configured default permissions at authorization time.
    pub permissions: Vec<Permission>,
    /// Owning tenant. `None` for platform-wide roles (superadmin only).
    pub tenant_id: Option<Uuid>,
    /// System roles are seeded, not user-created, and protected from
    /// tenant-level deletion.
    pub is_system: bool,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Role {
    /// Creates a builder for a new role.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> RoleBuilder {
        RoleBuilder {
            name: name.into(),
            description: None,
            permissions: Vec::new(),
            tenant_id: None,
            is_system: false,
        }
    }

    /// Whether this is the reserved superadmin role.
    ///
    /// The comparison is case-insensitive so `SuperAdmin` cannot be used to
    /// smuggle a second privileged role past the name checks.
    #[must_use]
    pub fn is_superadmin(&self) -> bool {
        self.name.eq_ignore_ascii_case(SUPERADMIN_ROLE)
    }

    /// Whether this role grants the given permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Builder for [`Role`].
#[derive(Debug)]
pub struct RoleBuilder {
    name: String,
    description: Option<String>,
    permissions: Vec<Permission>,
    tenant_id: Option<Uuid>,
    is_system: bool,
}

impl RoleBuilder {
    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the granted permissions.
    #[must_use]
    pub fn permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Binds the role to a tenant.
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Marks the role as a seeded system role.
    #[must_use]
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Builds the role with a fresh id and timestamps.
    #[must_use]
    pub fn build(self) -> Role {
        let now = OffsetDateTime::now_utc();
        Role {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            permissions: self.permissions,
            tenant_id: self.tenant_id,
            is_system: self.is_system,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage operations for roles.
#[async_trait]
pub trait RoleStorage: Send + Sync {
    /// Finds a role by id.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Role>>;

    /// Finds a role by name within a tenant (`None` = platform-wide roles).
    async fn find_by_name(&self, name: &str, tenant_id: Option<Uuid>)
    -> AuthResult<Option<Role>>;

    /// Lists roles. `tenant_id = None` lists across all tenants.
    async fn list(
        &self,
        tenant_id: Option<Uuid>,
        limit: usize,
        offset: usize,
    ) -> AuthResult<Vec<Role>>;

    /// Counts roles visible in the given tenant scope.
    async fn count(&self, tenant_id: Option<Uuid>) -> AuthResult<u64>;

    /// Persists a new role.
    async fn create(&self, role: &Role) -> AuthResult<()>;

    /// Persists several roles at once (tenant seeding).
    async fn create_many(&self, roles: &[Role]) -> AuthResult<()>;

    /// Persists changes to an existing role.
    async fn update(&self, role: &Role) -> AuthResult<()>;

    /// Deletes a role by id. Returns `false` if the role did not exist.
    async fn delete(&self, id: Uuid) -> AuthResult<bool>;
}
