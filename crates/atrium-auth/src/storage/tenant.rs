//! Tenant entity and storage trait.
//!
//! Tenant management is largely out of scope for the auth core; this module
//! carries only what registration and tenant-scoped lookups need.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthResult;

/// A tenant (customer organization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique identifier.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// Whether the tenant is active.
    pub active: bool,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last update timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Tenant {
    /// Creates a new active tenant with a fresh id and timestamps.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage operations for tenants.
#[async_trait]
pub trait TenantStorage: Send + Sync {
    /// Finds a tenant by id.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Tenant>>;

    /// Persists a new tenant.
    async fn create(&self, tenant: &Tenant) -> AuthResult<()>;
}
