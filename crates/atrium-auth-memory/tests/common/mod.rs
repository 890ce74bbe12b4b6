//! Shared harness wiring the services to the in-memory backends.
#![allow(dead_code)]

use std::sync::Arc;

use atrium_auth::cache::AuthCache;
use atrium_auth::password::hash_password;
use atrium_auth::storage::{Role, RoleStorage, Tenant, TenantStorage, User, UserStorage};
use atrium_auth::{
    AuthConfig, AuthService, Guard, JwtService, LookupCache, Permission, RoleService,
    TokenService, UserService,
};
use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use atrium_auth_memory::{MemoryCache, MemoryRoleStorage, MemoryTenantStorage, MemoryUserStorage};

pub struct TestEnv {
    pub cache: Arc<MemoryCache>,
    pub users: Arc<MemoryUserStorage>,
    pub roles: Arc<MemoryRoleStorage>,
    pub tenants: Arc<MemoryTenantStorage>,
    pub jwt: Arc<JwtService>,
    pub lookup: Arc<LookupCache>,
    pub guard: Arc<Guard>,
    pub tokens: Arc<TokenService>,
    pub role_service: RoleService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub config: AuthConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let mut config = AuthConfig::default();
        config.jwt.secret = "integration-test-secret".to_string();
        Self::with_config(config)
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let users = Arc::new(MemoryUserStorage::new());
        let roles = Arc::new(MemoryRoleStorage::new());
        let tenants = Arc::new(MemoryTenantStorage::new());
        let jwt = Arc::new(JwtService::new(&config.jwt.secret));

        let cache_dyn: Arc<dyn AuthCache> = cache.clone();
        let users_dyn: Arc<dyn UserStorage> = users.clone();
        let roles_dyn: Arc<dyn RoleStorage> = roles.clone();
        let tenants_dyn: Arc<dyn TenantStorage> = tenants.clone();

        let lookup = Arc::new(LookupCache::new(
            cache_dyn.clone(),
            users_dyn.clone(),
            roles_dyn.clone(),
            config.cache.clone(),
        ));
        let guard = Arc::new(Guard::new(
            jwt.clone(),
            cache_dyn.clone(),
            lookup.clone(),
            config.default_permissions.clone(),
        ));
        let tokens = Arc::new(TokenService::new(
            jwt.clone(),
            users_dyn.clone(),
            cache_dyn.clone(),
            config.clone(),
        ));
        let role_service =
            RoleService::new(roles_dyn.clone(), users_dyn.clone(), lookup.clone());
        let user_service =
            UserService::new(users_dyn.clone(), roles_dyn.clone(), lookup.clone());
        let auth_service = AuthService::new(tenants_dyn, roles_dyn, users_dyn);

        Self {
            cache,
            users,
            roles,
            tenants,
            jwt,
            lookup,
            guard,
            tokens,
            role_service,
            user_service,
            auth_service,
            config,
        }
    }

    /// Seeds a tenant with a role carrying `permissions`.
    pub async fn seed_tenant_role(&self, permissions: Vec<Permission>) -> (Tenant, Role) {
        let tenant = Tenant::new("Test Tenant");
        self.tenants.create(&tenant).await.unwrap();
        let role = Role::builder("member")
            .permissions(permissions)
            .tenant_id(tenant.id)
            .build();
        self.roles.create(&role).await.unwrap();
        (tenant, role)
    }

    /// Seeds a user with a hashed password.
    pub async fn seed_user(
        &self,
        tenant_id: Option<Uuid>,
        role_id: Uuid,
        username: &str,
        email: &str,
        password: &str,
    ) -> User {
        let mut builder = User::builder(
            format!("User {username}"),
            username,
            email,
            hash_password(password).unwrap(),
            role_id,
        );
        if let Some(t) = tenant_id {
            builder = builder.tenant_id(t);
        }
        let user = builder.build();
        self.users.create(&user).await.unwrap();
        user
    }

    /// Seeds the platform superadmin role and its user.
    pub async fn seed_superuser(&self, username: &str, password: &str) -> (Role, User) {
        let role = Role::builder("superadmin")
            .permissions(atrium_auth::service::role::superadmin_permissions())
            .system()
            .build();
        self.roles.create(&role).await.unwrap();
        let user = self
            .seed_user(
                None,
                role.id,
                username,
                &format!("{username}@example.com"),
                password,
            )
            .await;
        (role, user)
    }
}

pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}
