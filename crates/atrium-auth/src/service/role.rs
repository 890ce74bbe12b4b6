//! Role management with tenant isolation and escalation protection.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::LookupCache;
use crate::context::RequestScope;
use crate::error::{AuthError, AuthResult};
use crate::permissions::Permission;
use crate::storage::role::{Role, RoleStorage, SUPERADMIN_ROLE, TENANT_ADMIN_ROLE};
use crate::storage::user::UserStorage;

/// Input for role creation.
#[derive(Debug, Clone)]
pub struct NewRole {
    /// Role name, unique within the tenant.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
}

/// Input for role updates. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement permission set.
    pub permissions: Option<Vec<Permission>>,
}

/// Role management service.
pub struct RoleService {
    roles: Arc<dyn RoleStorage>,
    users: Arc<dyn UserStorage>,
    lookup: Arc<LookupCache>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(
        roles: Arc<dyn RoleStorage>,
        users: Arc<dyn UserStorage>,
        lookup: Arc<LookupCache>,
    ) -> Self {
        Self {
            roles,
            users,
            lookup,
        }
    }

    /// Fetches a role visible to the given scope.
    pub async fn get_by_id(&self, scope: &RequestScope, id: Uuid) -> AuthResult<Role> {
        let role = self
            .roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::not_found("role not found"))?;
        self.check_tenant(scope, role.tenant_id)?;
        Ok(role)
    }

    /// Lists roles visible to the given scope.
    pub async fn list(
        &self,
        scope: &RequestScope,
        limit: usize,
        offset: usize,
    ) -> AuthResult<Vec<Role>> {
        // Non-superusers always carry a tenant, so `None` here can only mean
        // a superuser listing across all tenants.
        self.roles.list(scope.tenant_id(), limit, offset).await
    }

    /// Creates a role in the scope's tenant.
    pub async fn create(&self, scope: &RequestScope, input: NewRole) -> AuthResult<Role> {
        if input.name.eq_ignore_ascii_case(SUPERADMIN_ROLE) {
            return Err(AuthError::invalid_request("role name is reserved"));
        }

        let tenant_id = scope.tenant_id().ok_or_else(|| {
            AuthError::invalid_request("a tenant context is required to create a role")
        })?;

        if self
            .roles
            .find_by_name(&input.name, Some(tenant_id))
            .await?
            .is_some()
        {
            return Err(AuthError::invalid_request(
                "a role with this name already exists",
            ));
        }

        let mut builder = Role::builder(&input.name)
            .permissions(input.permissions)
            .tenant_id(tenant_id);
        if let Some(description) = input.description {
            builder = builder.description(description);
        }
        let role = builder.build();

        self.roles.create(&role).await?;
        info!(role_id = %role.id, tenant_id = %tenant_id, name = %role.name, "role created");
        Ok(role)
    }

    /// Updates a role visible to the given scope.
    pub async fn update(
        &self,
        scope: &RequestScope,
        id: Uuid,
        changes: UpdateRole,
    ) -> AuthResult<Role> {
        let mut role = self.get_by_id(scope, id).await?;

        if role.is_superadmin() && !scope.is_superuser() {
            return Err(AuthError::forbidden(
                "only a superuser may modify the superadmin role",
            ));
        }

        if let Some(name) = changes.name {
            if name.eq_ignore_ascii_case(SUPERADMIN_ROLE) && !role.is_superadmin() {
                return Err(AuthError::invalid_request("role name is reserved"));
            }
            if name != role.name
                && self
                    .roles
                    .find_by_name(&name, role.tenant_id)
                    .await?
                    .is_some()
            {
                return Err(AuthError::invalid_request(
                    "a role with this name already exists",
                ));
            }
            role.name = name;
        }
        if let Some(description) = changes.description {
            role.description = Some(description);
        }
        if let Some(permissions) = changes.permissions {
            role.permissions = permissions;
        }
        role.updated_at = time::OffsetDateTime::now_utc();

        self.roles.update(&role).await?;
        self.lookup.invalidate_role(role.id, Some(&role)).await?;
        debug!(role_id = %role.id, "role updated");
        Ok(role)
    }

    /// Deletes a role visible to the given scope.
    pub async fn delete(&self, scope: &RequestScope, id: Uuid) -> AuthResult<()> {
        let role = self.get_by_id(scope, id).await?;

        if role.is_system && !scope.is_superuser() {
            return Err(AuthError::forbidden("system roles cannot be deleted"));
        }

        let in_use = self.users.count_by_role(role.id).await?;
        if in_use > 0 {
            return Err(AuthError::invalid_request(format!(
                "role is assigned to {in_use} user(s)"
            )));
        }

        self.roles.delete(role.id).await?;
        self.lookup.invalidate_role(role.id, None).await?;
        info!(role_id = %role.id, name = %role.name, "role deleted");
        Ok(())
    }

    /// Seeds the default roles for a freshly created tenant and returns
    /// them, tenant-admin first.
    pub async fn create_default_roles(&self, tenant_id: Uuid) -> AuthResult<Vec<Role>> {
        let roles = default_tenant_roles(tenant_id);
        self.roles.create_many(&roles).await?;
        info!(%tenant_id, count = roles.len(), "default tenant roles seeded");
        Ok(roles)
    }

    fn check_tenant(&self, scope: &RequestScope, tenant_id: Option<Uuid>) -> AuthResult<()> {
        if scope.can_access_tenant(tenant_id) {
            Ok(())
        } else {
            debug!(actor = %scope.user_id(), "tenant isolation violation on role access");
            Err(AuthError::forbidden("access denied for tenant"))
        }
    }
}

/// The permission set of the platform superadmin role.
#[must_use]
pub fn superadmin_permissions() -> Vec<Permission> {
    use Permission::*;
    vec![
        UsersCreate,
        UsersRead,
        UsersUpdate,
        UsersDelete,
        UsersActivate,
        UsersDeactivate,
        RolesCreate,
        RolesRead,
        RolesUpdate,
        RolesDelete,
        RolesAssign,
        RolesUnassign,
        TenantsCreate,
        TenantsRead,
        TenantsUpdate,
        TenantsDelete,
        TenantsActivate,
        TenantsDeactivate,
        SystemManageSettings,
        SystemViewLogs,
        SystemSendAnnouncement,
        SubscriptionView,
        SubscriptionChangePlan,
        DashboardView,
        DashboardViewNotifications,
    ]
}

/// The system roles seeded for every new tenant, tenant-admin first.
#[must_use]
pub fn default_tenant_roles(tenant_id: Uuid) -> Vec<Role> {
    use Permission::*;
    vec![
        Role::builder(TENANT_ADMIN_ROLE)
            .description("Tenant administrator managing users, tours, finances, and quotations")
            .permissions(vec![
                UsersCreate,
                UsersRead,
                UsersUpdate,
                UsersDelete,
                UsersActivate,
                UsersDeactivate,
                RolesCreate,
                RolesRead,
                RolesUpdate,
                RolesDelete,
                RolesAssign,
                RolesUnassign,
                ToursCreate,
                ToursRead,
                ToursUpdate,
                ToursDelete,
                RundownsCreate,
                RundownsRead,
                RundownsUpdate,
                RundownsDelete,
                RundownsAssignTeam,
                BudgetsCreate,
                BudgetsRead,
                BudgetsUpdate,
                BudgetsDelete,
                ExpensesCreate,
                ExpensesRead,
                ExpensesUpdate,
                ExpensesDelete,
                QuotationsCreate,
                QuotationsRead,
                QuotationsUpdate,
                QuotationsDelete,
                QuotationsSendToClient,
                ReportsViewSummary,
                ReportsViewPerTour,
                ReportsExportPdf,
                DashboardView,
                DashboardViewFinancialStatus,
                DashboardViewNotifications,
                SubscriptionView,
            ])
            .tenant_id(tenant_id)
            .system()
            .build(),
        Role::builder("operator")
            .description("Staff entering and managing tour, budget, rundown, and quotation data")
            .permissions(vec![
                ToursCreate,
                ToursRead,
                ToursUpdate,
                RundownsCreate,
                RundownsRead,
                RundownsUpdate,
                RundownsAssignTeam,
                BudgetsCreate,
                BudgetsRead,
                BudgetsUpdate,
                QuotationsCreate,
                QuotationsRead,
                QuotationsUpdate,
                DashboardView,
            ])
            .tenant_id(tenant_id)
            .system()
            .build(),
        Role::builder("finance")
            .description("Finance staff entering expenses and monitoring cost reports")
            .permissions(vec![
                ExpensesCreate,
                ExpensesRead,
                ExpensesUpdate,
                ReportsViewSummary,
                ReportsExportPdf,
                DashboardViewFinancialStatus,
            ])
            .tenant_id(tenant_id)
            .system()
            .build(),
    ]
}
