//! Business services enforcing tenant isolation and privilege rules.

pub mod auth;
pub mod role;
pub mod user;

pub use auth::{AuthService, Registration};
pub use role::{NewRole, RoleService, UpdateRole};
pub use user::{NewSuperuser, NewUser, UpdateUser, UserService};
