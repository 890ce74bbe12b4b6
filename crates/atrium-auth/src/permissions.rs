//! The platform permission catalog.
//!
//! Permissions are a closed set. Every permission string that can appear in a
//! role document, a route requirement, or the configured default set must be
//! one of the variants below; anything else is rejected at the DTO boundary
//! before it can reach storage.
//!
//! The wire format is `<resource>:<action>`, e.g. `users:create`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

macro_rules! permissions {
    ($( $variant:ident => $wire:literal ),+ $(,)?) => {
        /// A single permission in the platform catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Permission {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Permission {
            /// All permissions in the catalog, in declaration order.
            pub const CATALOG: &'static [Permission] = &[
                $( Permission::$variant, )+
            ];

            /// Returns the wire string for this permission.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Permission::$variant => $wire, )+
                }
            }
        }

        impl FromStr for Permission {
            type Err = AuthError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Permission::$variant), )+
                    other => Err(AuthError::invalid_request(format!(
                        "unknown permission: {other}"
                    ))),
                }
            }
        }
    };
}

permissions! {
    // User management
    UsersCreate => "users:create",
    UsersRead => "users:read",
    UsersUpdate => "users:update",
    UsersDelete => "users:delete",
    UsersActivate => "users:activate",
    UsersDeactivate => "users:deactivate",

    // Role management
    RolesCreate => "roles:create",
    RolesRead => "roles:read",
    RolesUpdate => "roles:update",
    RolesDelete => "roles:delete",
    RolesAssign => "roles:assign",
    RolesUnassign => "roles:unassign",

    // Tenant management
    TenantsCreate => "tenants:create",
    TenantsRead => "tenants:read",
    TenantsUpdate => "tenants:update",
    TenantsDelete => "tenants:delete",
    TenantsActivate => "tenants:activate",
    TenantsDeactivate => "tenants:deactivate",

    // Tours
    ToursCreate => "tours:create",
    ToursRead => "tours:read",
    ToursUpdate => "tours:update",
    ToursDelete => "tours:delete",

    // Rundowns
    RundownsCreate => "rundowns:create",
    RundownsRead => "rundowns:read",
    RundownsUpdate => "rundowns:update",
    RundownsDelete => "rundowns:delete",
    RundownsAssignTeam => "rundowns:assign_team",

    // Budgets
    BudgetsCreate => "budgets:create",
    BudgetsRead => "budgets:read",
    BudgetsUpdate => "budgets:update",
    BudgetsDelete => "budgets:delete",

    // Expenses
    ExpensesCreate => "expenses:create",
    ExpensesRead => "expenses:read",
    ExpensesUpdate => "expenses:update",
    ExpensesDelete => "expenses:delete",

    // Quotations
    QuotationsCreate => "quotations:create",
    QuotationsRead => "quotations:read",
    QuotationsUpdate => "quotations:update",
    QuotationsDelete => "quotations:delete",
    QuotationsSendToClient => "quotations:send_to_client",

    // Reports
    ReportsViewSummary => "reports:view_summary",
    ReportsViewPerTour => "reports:view_per_tour",
    ReportsExportPdf => "reports:export_pdf",

    // System administration
    SystemManageSettings => "system:manage_settings",
    SystemViewLogs => "system:view_logs",
    SystemSendAnnouncement => "system:send_announcement",

    // Subscription
    SubscriptionView => "subscription:view",
    SubscriptionChangePlan => "subscription:change_plan",

    // Dashboard
    DashboardView => "dashboard:view",
    DashboardViewFinancialStatus => "dashboard:view_financial_status",
    DashboardViewNotifications => "dashboard:view_notifications",
}

impl Permission {
    /// Parses a list of wire strings, failing on the first unknown entry.
    pub fn parse_all<I, S>(strings: I) -> Result<Vec<Permission>, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        strings
            .into_iter()
            .map(|s| s.as_ref().parse())
            .collect()
    }

    /// Returns the resource segment of the wire string (before the colon).
    #[must_use]
    pub fn resource(&self) -> &'static str {
        // Every catalog entry contains a colon.
        let s = self.as_str();
        match s.split_once(':') {
            Some((resource, _)) => resource,
            None => s,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        for &perm in Permission::CATALOG {
            let parsed: Permission = perm.as_str().parse().unwrap();
            assert_eq!(parsed, perm);
        }
    }

    #[test]
    fn test_unknown_permission_rejected() {
        let err = "users:explode".parse::<Permission>().unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert!(err.to_string().contains("users:explode"));
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&Permission::RundownsAssignTeam).unwrap();
        assert_eq!(json, "\"rundowns:assign_team\"");

        let perm: Permission = serde_json::from_str("\"quotations:send_to_client\"").unwrap();
        assert_eq!(perm, Permission::QuotationsSendToClient);

        assert!(serde_json::from_str::<Permission>("\"not:a_permission\"").is_err());
    }

    #[test]
    fn test_parse_all() {
        let perms = Permission::parse_all(["users:read", "roles:read"]).unwrap();
        assert_eq!(perms, vec![Permission::UsersRead, Permission::RolesRead]);

        assert!(Permission::parse_all(["users:read", "bogus"]).is_err());
    }

    #[test]
    fn test_resource_segment() {
        assert_eq!(Permission::UsersCreate.resource(), "users");
        assert_eq!(Permission::DashboardViewFinancialStatus.resource(), "dashboard");
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for &perm in Permission::CATALOG {
            assert!(seen.insert(perm.as_str()), "duplicate: {perm}");
        }
        assert_eq!(Permission::CATALOG.len(), 51);
    }
}
