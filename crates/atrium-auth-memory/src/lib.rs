//! # atrium-auth-memory
//!
//! In-memory implementations of the `atrium-auth` storage and cache traits,
//! backed by [`dashmap`]. Used as the development backend and by the
//! integration test suite. All operations are atomic per key; nothing here
//! survives a restart.

mod cache;
mod role;
mod tenant;
mod user;

pub use cache::MemoryCache;
pub use role::MemoryRoleStorage;
pub use tenant::MemoryTenantStorage;
pub use user::MemoryUserStorage;
