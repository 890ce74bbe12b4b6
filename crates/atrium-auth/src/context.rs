//! Per-request security context.

use uuid::Uuid;

/// The security context of one authenticated request.
///
/// Built exactly once by the access guard after token verification and
/// identity resolution, then passed explicitly to every service call made on
/// behalf of the request. There is no ambient or global context; two
/// concurrent requests never observe each other's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestScope {
    user_id: Uuid,
    tenant_id: Option<Uuid>,
    superuser: bool,
}

impl RequestScope {
    /// Creates a scope for a tenant-bound user.
    #[must_use]
    pub fn for_tenant_user(user_id: Uuid, tenant_id: Uuid) -> Self {
        Self {
            user_id,
            tenant_id: Some(tenant_id),
            superuser: false,
        }
    }

    /// Creates a scope for a superuser.
    ///
    /// `tenant_id` is the optional override target; superusers acting
    /// without an override see all tenants.
    #[must_use]
    pub fn for_superuser(user_id: Uuid, tenant_id: Option<Uuid>) -> Self {
        Self {
            user_id,
            tenant_id,
            superuser: true,
        }
    }

    /// The authenticated user's id.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The tenant this request is scoped to, if any.
    ///
    /// `None` means a superuser acting across tenants.
    #[must_use]
    pub fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }

    /// Whether the authenticated user holds the superadmin role.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.superuser
    }

    /// Returns `true` if this scope may touch data belonging to `tenant_id`.
    ///
    /// Superusers may touch everything. Tenant users may only touch their
    /// own tenant; entities without a tenant (platform-level records) are
    /// off limits to them.
    #[must_use]
    pub fn can_access_tenant(&self, tenant_id: Option<Uuid>) -> bool {
        if self.superuser {
            return true;
        }
        match (self.tenant_id, tenant_id) {
            (Some(own), Some(target)) => own == target,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_user_scope() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let scope = RequestScope::for_tenant_user(user_id, tenant_id);

        assert_eq!(scope.user_id(), user_id);
        assert_eq!(scope.tenant_id(), Some(tenant_id));
        assert!(!scope.is_superuser());
    }

    #[test]
    fn test_tenant_isolation() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = RequestScope::for_tenant_user(Uuid::new_v4(), tenant);

        assert!(scope.can_access_tenant(Some(tenant)));
        assert!(!scope.can_access_tenant(Some(other)));
        assert!(!scope.can_access_tenant(None));
    }

    #[test]
    fn test_superuser_accesses_everything() {
        let scope = RequestScope::for_superuser(Uuid::new_v4(), None);

        assert!(scope.is_superuser());
        assert!(scope.can_access_tenant(Some(Uuid::new_v4())));
        assert!(scope.can_access_tenant(None));
    }

    #[test]
    fn test_superuser_with_override_still_accesses_everything() {
        let target = Uuid::new_v4();
        let scope = RequestScope::for_superuser(Uuid::new_v4(), Some(target));

        assert_eq!(scope.tenant_id(), Some(target));
        assert!(scope.can_access_tenant(Some(Uuid::new_v4())));
    }
}
