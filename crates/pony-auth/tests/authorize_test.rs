//! Integration tests for the authorization pipeline.

use pony_auth::config::AuthConfig;
use pony_auth::error::AuthError;
use pony_auth::token::{SessionClaims, TokenService};
use pony_auth::{Authorizer, SlidingWindowLimiter};
use pony_core::error::PonyError;
use pony_core::models::permission::{PermissionName, PermissionSet};
use pony_core::models::tenant::TenantId;
use pony_core::models::user::{CreateUser, User};
use pony_core::repository::UserRepository;
use pony_db::repository::SurrealUserRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

const DINERS: &[PermissionName] = &[
    PermissionName::Customer,
    PermissionName::Restaurant,
    PermissionName::Admin,
];
const STAFF: &[PermissionName] = &[PermissionName::Restaurant, PermissionName::Admin];

struct Fixture {
    authorizer: Authorizer<SurrealUserRepository<Db>>,
    users: SurrealUserRepository<Db>,
    tokens: TokenService,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pony_db::run_migrations(&db).await.unwrap();

    let tokens = TokenService::new(&AuthConfig::with_secret("pipeline-secret"));
    let users = SurrealUserRepository::new(db);
    Fixture {
        authorizer: Authorizer::new(tokens.clone(), users.clone()),
        users,
        tokens,
    }
}

async fn user_with(fx: &Fixture, tenant: TenantId, perms: &[PermissionName]) -> User {
    fx.users
        .create(CreateUser {
            tenant_id: tenant.as_uuid(),
            name: "Tom".into(),
            email: format!("{}@bree.me", Uuid::new_v4()),
            password: "hey-dol-merry-dol".into(),
            permissions: perms.iter().copied().collect::<PermissionSet>(),
        })
        .await
        .unwrap()
}

fn assert_unauthenticated(result: Result<impl std::fmt::Debug, PonyError>) {
    let err = result.unwrap_err();
    assert!(
        matches!(err, PonyError::AuthenticationFailed { .. }),
        "expected unauthenticated, got {err:?}"
    );
}

fn assert_forbidden(result: Result<impl std::fmt::Debug, PonyError>) {
    let err = result.unwrap_err();
    assert!(
        matches!(err, PonyError::AuthorizationDenied { .. }),
        "expected forbidden, got {err:?}"
    );
}

#[tokio::test]
async fn customer_in_own_tenant_is_admitted() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    let user = user_with(&fx, tenant, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();

    let identity = fx
        .authorizer
        .authorize(Some(&token), Some(tenant), DINERS)
        .await
        .unwrap();

    assert_eq!(identity.user_id, user.id);
    assert_eq!(identity.tenant_id, tenant);
    assert_eq!(identity.email, user.email);
    assert!(identity.permissions.contains(PermissionName::Customer));
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthenticated() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());

    assert_unauthenticated(fx.authorizer.authorize(None, Some(tenant), DINERS).await);
    assert_unauthenticated(
        fx.authorizer
            .authorize(Some("garbage"), Some(tenant), DINERS)
            .await,
    );

    let foreign = TokenService::new(&AuthConfig::with_secret("other"))
        .issue(Uuid::new_v4())
        .unwrap();
    assert_unauthenticated(
        fx.authorizer
            .authorize(Some(&foreign), Some(tenant), DINERS)
            .await,
    );
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    let user = user_with(&fx, tenant, &[PermissionName::Customer]).await;
    let now = chrono::Utc::now().timestamp();
    let token = fx
        .tokens
        .encode(&SessionClaims {
            sub: user.id.to_string(),
            iat: now - 90_000,
            exp: now - 3_600,
        })
        .unwrap();

    assert_unauthenticated(
        fx.authorizer
            .authorize(Some(&token), Some(tenant), DINERS)
            .await,
    );
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthenticated() {
    let fx = setup().await;
    let token = fx.tokens.issue(Uuid::new_v4()).unwrap();
    assert_unauthenticated(fx.authorizer.authorize(Some(&token), None, &[]).await);
}

#[tokio::test]
async fn cross_tenant_customer_is_forbidden() {
    let fx = setup().await;
    let home = TenantId(Uuid::new_v4());
    let elsewhere = TenantId(Uuid::new_v4());
    let user = user_with(&fx, home, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();

    assert_forbidden(
        fx.authorizer
            .authorize(Some(&token), Some(elsewhere), DINERS)
            .await,
    );
}

#[tokio::test]
async fn admin_crosses_tenants() {
    let fx = setup().await;
    let home = TenantId(Uuid::new_v4());
    let elsewhere = TenantId(Uuid::new_v4());
    let admin = user_with(&fx, home, &[PermissionName::Admin]).await;
    let token = fx.tokens.issue(admin.id).unwrap();

    let identity = fx
        .authorizer
        .authorize(Some(&token), Some(elsewhere), STAFF)
        .await
        .unwrap();
    assert_eq!(identity.tenant_id, home);
}

#[tokio::test]
async fn missing_permission_is_forbidden() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    let user = user_with(&fx, tenant, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();

    assert_forbidden(
        fx.authorizer
            .authorize(Some(&token), Some(tenant), STAFF)
            .await,
    );
}

#[tokio::test]
async fn empty_requirement_admits_any_identity() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    let user = user_with(&fx, tenant, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();

    fx.authorizer
        .authorize(Some(&token), Some(tenant), &[])
        .await
        .unwrap();
}

#[tokio::test]
async fn tenant_check_precedes_permission_check() {
    let fx = setup().await;
    let home = TenantId(Uuid::new_v4());
    let user = user_with(&fx, home, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();

    let err = fx
        .authorizer
        .authorize(Some(&token), Some(TenantId(Uuid::new_v4())), STAFF)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        PonyError::from(AuthError::TenantMismatch).to_string()
    );
}

#[tokio::test]
async fn authorized_caller_is_limited_after_five_requests() {
    let fx = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    let user = user_with(&fx, tenant, &[PermissionName::Customer]).await;
    let token = fx.tokens.issue(user.id).unwrap();
    let limiter = SlidingWindowLimiter::default();

    let mut admitted = 0;
    for _ in 0..6 {
        let identity = fx
            .authorizer
            .authorize(Some(&token), Some(tenant), DINERS)
            .await
            .unwrap();
        if limiter.check(&identity.user_id.to_string()).is_allowed() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 5);
}
