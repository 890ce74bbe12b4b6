//! Atrium admin backend server.

mod config;

use std::env;
use std::sync::Arc;

use atrium_auth::cache::AuthCache;
use atrium_auth::service::NewSuperuser;
use atrium_auth::storage::{RoleStorage, TenantStorage, UserStorage};
use atrium_auth::{
    AuthHttpState, AuthService, Guard, JwtService, LookupCache, TokenService, UserService,
    router,
};
use atrium_auth_memory::{MemoryCache, MemoryRoleStorage, MemoryTenantStorage, MemoryUserStorage};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_CONFIG_PATH, ServerConfig, load_config};

#[tokio::main]
async fn main() {
    // Optional .env for local development; absence is not an error.
    if let Err(e) = dotenvy::dotenv()
        && !matches!(e, dotenvy::Error::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound)
    {
        eprintln!("warning: failed to load .env file: {e}");
    }

    let config_path =
        env::var("ATRIUM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.clone())),
        )
        .init();
    info!(path = %config_path, "configuration loaded");

    if let Err(e) = run(cfg).await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run(cfg: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cache: Arc<dyn AuthCache> = Arc::new(MemoryCache::new());
    let users: Arc<dyn UserStorage> = Arc::new(MemoryUserStorage::new());
    let roles: Arc<dyn RoleStorage> = Arc::new(MemoryRoleStorage::new());
    let tenants: Arc<dyn TenantStorage> = Arc::new(MemoryTenantStorage::new());

    let jwt = Arc::new(JwtService::new(&cfg.auth.jwt.secret));
    let lookup = Arc::new(LookupCache::new(
        cache.clone(),
        users.clone(),
        roles.clone(),
        cfg.auth.cache.clone(),
    ));
    let guard = Arc::new(Guard::new(
        jwt.clone(),
        cache.clone(),
        lookup.clone(),
        cfg.auth.default_permissions.clone(),
    ));
    let tokens = Arc::new(TokenService::new(
        jwt.clone(),
        users.clone(),
        cache.clone(),
        cfg.auth.clone(),
    ));
    let auth = Arc::new(AuthService::new(
        tenants.clone(),
        roles.clone(),
        users.clone(),
    ));
    let user_service = UserService::new(users.clone(), roles.clone(), lookup.clone());

    if let Some(bootstrap) = &cfg.bootstrap {
        bootstrap_superuser(&user_service, bootstrap, users.as_ref()).await?;
    }

    let app = router(AuthHttpState {
        tokens,
        auth,
        guard,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shutdown complete");
    Ok(())
}

async fn bootstrap_superuser(
    user_service: &UserService,
    bootstrap: &config::BootstrapConfig,
    users: &dyn UserStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    if users.find_superuser().await?.is_some() {
        info!("superuser already present, skipping bootstrap");
        return Ok(());
    }

    let root = user_service
        .setup_superuser(NewSuperuser {
            full_name: bootstrap.full_name.clone(),
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            password: bootstrap.password.clone(),
        })
        .await?;
    info!(user_id = %root.id, "superuser bootstrapped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}
