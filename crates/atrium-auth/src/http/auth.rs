//! Handlers for the `/auth` routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthResult;
use crate::guard::{Authenticated, Guard, RouteAccess};
use crate::http::response::HttpResponse;
use crate::permissions::Permission;
use crate::service::{AuthService, Registration};
use crate::storage::User;
use crate::token::{Credential, TokenService};

/// Access declarations for the auth routes.
const LOGOUT_ACCESS: RouteAccess = RouteAccess::requiring(&[Permission::UsersDeactivate]);
const ME_ACCESS: [Permission; 1] = [Permission::UsersRead];

/// Shared state for the auth routes.
#[derive(Clone)]
pub struct AuthHttpState {
    /// Token lifecycle service.
    pub tokens: Arc<TokenService>,
    /// Registration service.
    pub auth: Arc<AuthService>,
    /// Access guard.
    pub guard: Arc<Guard>,
}

/// Builds the `/auth` router.
///
/// The guard is also installed as a request extension so the
/// [`Authenticated`] extractor can reach it.
pub fn router(state: AuthHttpState) -> Router {
    let guard = state.guard.clone();
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .layer(Extension(guard))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    identifier: String,
    password: String,
}

/// Body for logout and refresh. The field name matches the wire contract
/// the original clients already speak.
#[derive(Debug, Deserialize)]
struct RefreshTokenBody {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Debug, Serialize)]
struct TokenPairResponse {
    access_token: String,
    refresh_token: String,
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    tenant_name: String,
    full_name: String,
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    tenant_id: Uuid,
    user: User,
}

async fn login(
    State(state): State<AuthHttpState>,
    Json(body): Json<LoginRequest>,
) -> AuthResult<HttpResponse<TokenPairResponse>> {
    let pair = state
        .tokens
        .login(&Credential {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    Ok(HttpResponse::ok(
        "login successful",
        TokenPairResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            id: pair.user_id,
        },
    ))
}

async fn logout(
    State(state): State<AuthHttpState>,
    headers: HeaderMap,
    Json(body): Json<RefreshTokenBody>,
) -> AuthResult<HttpResponse<()>> {
    state.guard.authorize(&headers, &LOGOUT_ACCESS).await?;

    // The guard already validated the header shape.
    let access_token = bearer_from(&headers);
    state.tokens.logout(access_token, &body.refresh_token).await?;
    Ok(HttpResponse::ok_empty("logged out"))
}

async fn refresh_token(
    State(state): State<AuthHttpState>,
    Json(body): Json<RefreshTokenBody>,
) -> AuthResult<HttpResponse<TokenPairResponse>> {
    let pair = state.tokens.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::ok(
        "token refreshed",
        TokenPairResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            id: pair.user_id,
        },
    ))
}

async fn register(
    State(state): State<AuthHttpState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<HttpResponse<RegisterResponse>> {
    let (tenant, admin) = state
        .auth
        .register(Registration {
            tenant_name: body.tenant_name,
            full_name: body.full_name,
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(HttpResponse::created(
        "tenant registered",
        RegisterResponse {
            tenant_id: tenant.id,
            user: admin.sanitized(),
        },
    ))
}

async fn me(Authenticated(session): Authenticated) -> AuthResult<HttpResponse<User>> {
    session.require_any(&ME_ACCESS)?;
    Ok(HttpResponse::ok("profile", session.user.sanitized()))
}

fn bearer_from(headers: &HeaderMap) -> &str {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
}
