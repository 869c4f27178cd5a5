//! Integration tests for the authentication service.

use pony_auth::config::AuthConfig;
use pony_auth::service::{AuthService, LoginInput, RegisterInput};
use pony_auth::token::TokenService;
use pony_core::error::PonyError;
use pony_core::models::permission::PermissionName;
use pony_core::models::tenant::TenantId;
use pony_core::repository::UserRepository;
use pony_db::repository::{SurrealPermissionRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = AuthService<SurrealUserRepository<Db>, SurrealPermissionRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig::with_secret("test-secret")
}

async fn setup() -> (Service, SurrealUserRepository<Db>, TokenService) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pony_db::run_migrations(&db).await.unwrap();

    let config = test_config();
    let tokens = TokenService::new(&config);
    let users = SurrealUserRepository::new(db.clone());
    let service = AuthService::new(
        users.clone(),
        SurrealPermissionRepository::new(db),
        tokens.clone(),
        config,
    );
    (service, users, tokens)
}

fn register_input(email: &str) -> RegisterInput {
    RegisterInput {
        name: "Barliman Butterbur".into(),
        email: email.into(),
        password: "nob-and-bob".into(),
        permissions: vec!["restaurant".into(), "customer".into()],
    }
}

#[tokio::test]
async fn register_then_login() {
    let (service, users, tokens) = setup().await;
    let tenant = TenantId(Uuid::new_v4());

    let user = service
        .register(tenant, register_input("barliman@bree.me"))
        .await
        .unwrap();
    assert_eq!(user.tenant_id, tenant.as_uuid());
    assert!(user.permissions.contains(PermissionName::Restaurant));
    assert!(user.permissions.contains(PermissionName::Customer));

    let stored = users.get_by_id(user.id).await.unwrap();
    assert_ne!(stored.password_hash, "nob-and-bob");

    let output = service
        .login(
            tenant,
            LoginInput {
                email: "barliman@bree.me".into(),
                password: "nob-and-bob".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(output.expires_in, 86_400);
    assert_eq!(tokens.verify(&output.token).unwrap(), user.id);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (service, _, _) = setup().await;
    let tenant = TenantId(Uuid::new_v4());

    service
        .register(tenant, register_input("nob@bree.me"))
        .await
        .unwrap();
    let err = service
        .register(tenant, register_input("nob@bree.me"))
        .await
        .unwrap_err();
    assert!(matches!(err, PonyError::AlreadyExists { .. }));

    // Another restaurant may reuse the address.
    service
        .register(TenantId(Uuid::new_v4()), register_input("nob@bree.me"))
        .await
        .unwrap();
}

#[tokio::test]
async fn registration_shape_is_validated() {
    let (service, _, _) = setup().await;
    let tenant = TenantId(Uuid::new_v4());

    let cases = [
        RegisterInput {
            name: "  ".into(),
            ..register_input("a@bree.me")
        },
        RegisterInput {
            email: "no-at-sign".into(),
            ..register_input("a@bree.me")
        },
        RegisterInput {
            password: "short".into(),
            ..register_input("a@bree.me")
        },
        RegisterInput {
            permissions: vec![],
            ..register_input("a@bree.me")
        },
        RegisterInput {
            permissions: vec!["wizard".into()],
            ..register_input("a@bree.me")
        },
    ];

    for input in cases {
        let err = service.register(tenant, input).await.unwrap_err();
        assert!(matches!(err, PonyError::Validation { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn unknown_email_and_wrong_password_fail_alike() {
    let (service, _, _) = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    service
        .register(tenant, register_input("bob@bree.me"))
        .await
        .unwrap();

    let wrong_password = service
        .login(
            tenant,
            LoginInput {
                email: "bob@bree.me".into(),
                password: "not-the-password".into(),
            },
        )
        .await
        .unwrap_err();
    let unknown_email = service
        .login(
            tenant,
            LoginInput {
                email: "nobody@bree.me".into(),
                password: "nob-and-bob".into(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        wrong_password,
        PonyError::AuthenticationFailed { .. }
    ));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn login_is_tenant_scoped() {
    let (service, _, _) = setup().await;
    let tenant = TenantId(Uuid::new_v4());
    service
        .register(tenant, register_input("bill@bree.me"))
        .await
        .unwrap();

    let err = service
        .login(
            TenantId(Uuid::new_v4()),
            LoginInput {
                email: "bill@bree.me".into(),
                password: "nob-and-bob".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PonyError::AuthenticationFailed { .. }));
}
