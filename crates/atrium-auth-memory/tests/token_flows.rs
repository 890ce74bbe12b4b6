//! Token lifecycle scenarios against the in-memory backends.

mod common;

use atrium_auth::cache::TokenKind;
use atrium_auth::token::{Credential, TokenClaims};
use atrium_auth::{AuthConfig, AuthError, Permission, UserStorage};
use time::OffsetDateTime;
use uuid::Uuid;

use common::TestEnv;

fn credential(identifier: &str, password: &str) -> Credential {
    Credential {
        identifier: identifier.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn login_issues_non_overlapping_pair() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![Permission::UsersRead]).await;
    let user = env
        .seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let pair = env
        .tokens
        .login(&credential("ada@example.com", "pw123"))
        .await
        .unwrap();
    assert_eq!(pair.user_id, user.id);

    let access = env.jwt.decode(&pair.access_token).unwrap();
    let refresh = env.jwt.decode_unchecked(&pair.refresh_token).unwrap();

    assert_eq!(access.sub, user.id);
    assert_eq!(refresh.sub, user.id);
    assert!(access.nbf.is_none());
    // The refresh token only becomes valid when the access token expires.
    assert_eq!(refresh.nbf, Some(access.exp));
    assert!(refresh.exp > access.exp);
}

#[tokio::test]
async fn login_accepts_username_identifier() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    assert!(env.tokens.login(&credential("ada", "pw123")).await.is_ok());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let unknown = env
        .tokens
        .login(&credential("nobody@example.com", "pw123"))
        .await
        .unwrap_err();
    let wrong_password = env
        .tokens
        .login(&credential("ada@example.com", "nope"))
        .await
        .unwrap_err();

    // Same variant, same message: the caller cannot tell which part failed.
    assert_eq!(unknown.to_string(), wrong_password.to_string());
    assert!(matches!(unknown, AuthError::Unauthenticated { .. }));
}

#[tokio::test]
async fn logout_revokes_both_tokens() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let pair = env
        .tokens
        .login(&credential("ada", "pw123"))
        .await
        .unwrap();

    assert!(
        !env.tokens
            .is_revoked(TokenKind::Access, &pair.access_token)
            .await
            .unwrap()
    );

    env.tokens
        .logout(&pair.access_token, &pair.refresh_token)
        .await
        .unwrap();

    assert!(
        env.tokens
            .is_revoked(TokenKind::Access, &pair.access_token)
            .await
            .unwrap()
    );
    assert!(
        env.tokens
            .is_revoked(TokenKind::Refresh, &pair.refresh_token)
            .await
            .unwrap()
    );

    let err = env.tokens.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));
}

#[tokio::test]
async fn logout_with_undecodable_token_is_bad_request() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let pair = env
        .tokens
        .login(&credential("ada", "pw123"))
        .await
        .unwrap();

    let err = env
        .tokens
        .logout(&pair.access_token, "not-a-jwt")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidRequest { .. }));
    // Nothing was blacklisted.
    assert!(
        !env.tokens
            .is_revoked(TokenKind::Access, &pair.access_token)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn refresh_before_access_expiry_is_rejected() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let pair = env
        .tokens
        .login(&credential("ada", "pw123"))
        .await
        .unwrap();

    let err = env.tokens.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenNotYetValid));
}

/// A refresh token whose not-before has already elapsed.
fn mature_refresh_token(env: &TestEnv, sub: Uuid) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    env.jwt
        .encode(&TokenClaims {
            sub,
            iat: now - 60,
            exp: now + 86_400,
            nbf: Some(now - 10),
        })
        .unwrap()
}

#[tokio::test]
async fn mature_refresh_rotates_and_blacklists_old_token() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    let user = env
        .seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let old = mature_refresh_token(&env, user.id);
    let pair = env.tokens.refresh(&old).await.unwrap();
    assert_eq!(pair.user_id, user.id);

    // Rotation consumed the old token.
    assert!(
        env.tokens
            .is_revoked(TokenKind::Refresh, &old)
            .await
            .unwrap()
    );
    let err = env.tokens.refresh(&old).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));
}

#[tokio::test]
async fn rotation_can_be_disabled() {
    let mut config = AuthConfig::default();
    config.jwt.secret = "integration-test-secret".to_string();
    config.jwt.rotate_refresh_tokens = false;
    let env = TestEnv::with_config(config);

    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    let user = env
        .seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let old = mature_refresh_token(&env, user.id);
    env.tokens.refresh(&old).await.unwrap();

    // The consumed token stays usable until natural expiry.
    assert!(
        !env.tokens
            .is_revoked(TokenKind::Refresh, &old)
            .await
            .unwrap()
    );
    assert!(env.tokens.refresh(&old).await.is_ok());
}

#[tokio::test]
async fn expired_refresh_is_distinguishable() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    let user = env
        .seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let now = OffsetDateTime::now_utc().unix_timestamp();
    let expired = env
        .jwt
        .encode(&TokenClaims {
            sub: user.id,
            iat: now - 7_200,
            exp: now - 3_600,
            nbf: Some(now - 7_000),
        })
        .unwrap();

    let err = env.tokens.refresh(&expired).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
}

#[tokio::test]
async fn refresh_for_deleted_user_is_not_found() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    let user = env
        .seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let token = mature_refresh_token(&env, user.id);
    env.users.delete(user.id).await.unwrap();

    let err = env.tokens.refresh(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::NotFound { .. }));
}

#[tokio::test]
async fn concurrent_sessions_are_independent() {
    let env = TestEnv::new();
    let (tenant, role) = env.seed_tenant_role(vec![]).await;
    env.seed_user(Some(tenant.id), role.id, "ada", "ada@example.com", "pw123")
        .await;

    let first = env
        .tokens
        .login(&credential("ada", "pw123"))
        .await
        .unwrap();
    // Claims carry second-resolution timestamps; step past the issuance
    // second so the two pairs are distinct token strings.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = env
        .tokens
        .login(&credential("ada", "pw123"))
        .await
        .unwrap();
    assert_ne!(first.access_token, second.access_token);

    // Revoking one session leaves the other intact.
    env.tokens
        .logout(&first.access_token, &first.refresh_token)
        .await
        .unwrap();
    assert!(
        !env.tokens
            .is_revoked(TokenKind::Access, &second.access_token)
            .await
            .unwrap()
    );
}
