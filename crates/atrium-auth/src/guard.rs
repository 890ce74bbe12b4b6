//! The access guard: gates every non-public operation and builds the
//! request security context.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::{AuthCache, LookupCache, TokenKind, blacklist_key};
use crate::context::RequestScope;
use crate::error::{AuthError, AuthResult};
use crate::permissions::Permission;
use crate::storage::User;
use crate::token::JwtService;

/// Header a superuser may set to act within a specific tenant.
pub const TENANT_OVERRIDE_HEADER: &str = "x-tenant-id";

/// Access declaration for one route or operation.
#[derive(Debug, Clone, Copy)]
pub struct RouteAccess {
    /// Whether anonymous callers are allowed.
    pub public: bool,
    /// Permissions of which the caller must hold at least one.
    pub required: &'static [Permission],
}

impl RouteAccess {
    /// A fully public route.
    pub const PUBLIC: RouteAccess = RouteAccess {
        public: true,
        required: &[],
    };

    /// An authenticated route with no specific permission requirement.
    pub const AUTHENTICATED: RouteAccess = RouteAccess {
        public: false,
        required: &[],
    };

    /// An authenticated route requiring at least one of `required`.
    #[must_use]
    pub const fn requiring(required: &'static [Permission]) -> Self {
        Self {
            public: false,
            required,
        }
    }

    /// Whether anonymous access is actually allowed, given the configured
    /// default permission set.
    ///
    /// A route can be declared public while also naming required
    /// permissions; if those overlap the default set the route is gating an
    /// elevated action and must authenticate after all.
    #[must_use]
    pub fn is_effectively_public(&self, defaults: &[Permission]) -> bool {
        self.public && !self.required.iter().any(|p| defaults.contains(p))
    }
}

/// The result of a successful authentication: the resolved user, their
/// effective permission set, and the scope services receive.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The authenticated user, with role embedded.
    pub user: User,
    /// The request scope passed to services.
    pub scope: RequestScope,
    /// Effective permissions (role's own, or the configured defaults when
    /// the role carries none).
    pub permissions: Vec<Permission>,
}

impl AuthSession {
    /// Whether the session holds the given permission.
    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Fails with `Forbidden` unless the session holds at least one of
    /// `required`. An empty requirement always passes.
    pub fn require_any(&self, required: &[Permission]) -> AuthResult<()> {
        if required.is_empty() || required.iter().any(|p| self.has(*p)) {
            Ok(())
        } else {
            Err(AuthError::forbidden("insufficient permissions"))
        }
    }
}

/// Authenticates requests and enforces route access declarations.
pub struct Guard {
    jwt: Arc<JwtService>,
    cache: Arc<dyn AuthCache>,
    lookup: Arc<LookupCache>,
    default_permissions: Vec<Permission>,
}

impl Guard {
    /// Creates a new guard.
    pub fn new(
        jwt: Arc<JwtService>,
        cache: Arc<dyn AuthCache>,
        lookup: Arc<LookupCache>,
        default_permissions: Vec<Permission>,
    ) -> Self {
        Self {
            jwt,
            cache,
            lookup,
            default_permissions,
        }
    }

    /// Applies the full access algorithm for one request.
    ///
    /// Returns `None` when the route is effectively public and no session
    /// is established; otherwise the authenticated session.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        access: &RouteAccess,
    ) -> AuthResult<Option<AuthSession>> {
        if access.is_effectively_public(&self.default_permissions) {
            return Ok(None);
        }

        let session = self.authenticate(headers).await?;
        session.require_any(access.required).map_err(|err| {
            debug!(
                user_id = %session.scope.user_id(),
                required = ?access.required,
                "request rejected: missing required permission"
            );
            err
        })?;
        Ok(Some(session))
    }

    /// Authenticates a request from its headers.
    ///
    /// Validation order is fixed: bearer extraction, blacklist check (before
    /// any storage read), signature/expiry verification, then identity
    /// resolution through the cache-aside layer.
    pub async fn authenticate(&self, headers: &HeaderMap) -> AuthResult<AuthSession> {
        let token = bearer_token(headers)?;

        if self
            .cache
            .get(&blacklist_key(TokenKind::Access, token))
            .await?
            .is_some()
        {
            debug!("request rejected: access token revoked");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.jwt.decode(token)?;

        let user = self
            .lookup
            .get_user(claims.sub)
            .await?
            .ok_or_else(|| AuthError::unauthenticated("unknown subject"))?;

        if !user.active {
            debug!(user_id = %user.id, "request rejected: account deactivated");
            return Err(AuthError::forbidden("account is deactivated"));
        }

        let role = self
            .lookup
            .get_role(user.role_id)
            .await?
            .ok_or_else(|| AuthError::internal("user references a missing role"))?;

        let permissions = if role.permissions.is_empty() {
            self.default_permissions.clone()
        } else {
            role.permissions.clone()
        };

        let scope = if role.is_superadmin() {
            RequestScope::for_superuser(user.id, tenant_override(headers)?)
        } else {
            let tenant_id = user
                .tenant_id
                .ok_or_else(|| AuthError::internal("non-superuser account has no tenant"))?;
            RequestScope::for_tenant_user(user.id, tenant_id)
        };

        let user = User {
            role: Some(role),
            ..user
        };

        Ok(AuthSession {
            user,
            scope,
            permissions,
        })
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AuthError::unauthenticated("missing authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| AuthError::unauthenticated("malformed authorization header"))?;

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::unauthenticated("malformed authorization header")),
    }
}

/// Reads the tenant override header. Only consulted for superusers.
fn tenant_override(headers: &HeaderMap) -> AuthResult<Option<Uuid>> {
    let Some(header) = headers.get(TENANT_OVERRIDE_HEADER) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| {
        warn!("rejecting non-ascii tenant override header");
        AuthError::invalid_request("invalid x-tenant-id header")
    })?;
    let tenant_id = value.parse::<Uuid>().map_err(|_| {
        warn!(value, "rejecting unparseable tenant override header");
        AuthError::invalid_request("invalid x-tenant-id header")
    })?;
    Ok(Some(tenant_id))
}

/// Extractor for handlers on authenticated routes.
///
/// Expects an `Arc<Guard>` request extension, installed by the router
/// assembly. Permission requirements beyond authentication are checked in
/// the handler via [`AuthSession::require_any`].
pub struct Authenticated(pub AuthSession);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let guard = parts
            .extensions
            .get::<Arc<Guard>>()
            .cloned()
            .ok_or_else(|| AuthError::internal("guard extension not installed"))?;
        let session = guard.authenticate(&parts.headers).await?;
        Ok(Authenticated(session))
    }
}
