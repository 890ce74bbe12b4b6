//! # atrium-auth
//!
//! Authentication and multi-tenant authorization core for the Atrium admin
//! backend.
//!
//! This crate provides:
//! - JWT access/refresh token lifecycle (issue, verify, refresh, revoke)
//! - A request security context built once per request by the access guard
//! - The access guard itself, usable as an axum extractor or directly
//! - A closed permission catalog with role-based authorization
//! - A cache-aside lookup layer for hot-path user/role resolution
//! - Role, user, and tenant-registration services enforcing tenant
//!   isolation and privilege-escalation rules
//!
//! ## Overview
//!
//! Persistence and the shared cache are external collaborators behind the
//! traits in [`storage`] and [`cache`]; the `atrium-auth-memory` crate
//! provides the in-memory reference backends. The persistence store is
//! always the source of truth; caches are an optimization only.
//!
//! ## Modules
//!
//! - [`config`] - Auth configuration (JWT, cache TTLs, default permissions)
//! - [`error`] - Error taxonomy and HTTP status mapping
//! - [`permissions`] - The closed permission catalog
//! - [`context`] - The per-request security context
//! - [`token`] - JWT encoding and the token lifecycle service
//! - [`guard`] - The access guard and axum extractor
//! - [`cache`] - Cache trait and cache-aside lookup layer
//! - [`password`] - Password hashing
//! - [`storage`] - Entities and storage traits
//! - [`service`] - Role/user/registration services
//! - [`http`] - Axum handlers for the `/auth` routes

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod http;
pub mod password;
pub mod permissions;
pub mod service;
pub mod storage;
pub mod token;

pub use cache::{AuthCache, LookupCache, TokenKind};
pub use config::{AuthConfig, CacheConfig, ConfigError, JwtConfig};
pub use context::RequestScope;
pub use error::{AuthError, AuthResult, ErrorCategory};
pub use guard::{AuthSession, Authenticated, Guard, RouteAccess, TENANT_OVERRIDE_HEADER};
pub use http::{AuthHttpState, HttpResponse, router};
pub use permissions::Permission;
pub use service::{
    AuthService, NewRole, NewSuperuser, NewUser, Registration, RoleService, UpdateRole,
    UpdateUser, UserService,
};
pub use storage::{Role, RoleStorage, Tenant, TenantStorage, User, UserStorage};
pub use token::{Credential, JwtService, TokenClaims, TokenPair, TokenService};
