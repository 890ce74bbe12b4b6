//! Storage abstractions for auth entities.
//!
//! Persistence is an external collaborator behind these traits. The auth
//! core never assumes a backend; `atrium-auth-memory` provides the reference
//! in-memory implementation and production deployments plug in their own.

pub mod role;
pub mod tenant;
pub mod user;

pub use role::{Role, RoleStorage};
pub use tenant::{Tenant, TenantStorage};
pub use user::{User, UserStorage};
