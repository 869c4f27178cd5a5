//! Registration and login.

use pony_core::error::{PonyError, PonyResult};
use pony_core::models::permission::{PermissionName, PermissionSet};
use pony_core::models::tenant::TenantId;
use pony_core::models::user::{CreateUser, User};
use pony_core::repository::{PermissionRepository, UserRepository};
use tracing::info;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::TokenService;

/// Input for the registration flow.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Requested permission names, resolved against the permission
    /// table.
    pub permissions: Vec<String>,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, P: PermissionRepository> {
    user_repo: U,
    permission_repo: P,
    tokens: TokenService,
    config: AuthConfig,
}

impl<U: UserRepository, P: PermissionRepository> AuthService<U, P> {
    pub fn new(user_repo: U, permission_repo: P, tokens: TokenService, config: AuthConfig) -> Self {
        Self {
            user_repo,
            permission_repo,
            tokens,
            config,
        }
    }

    /// Register a new user in `tenant`.
    pub async fn register(&self, tenant: TenantId, input: RegisterInput) -> PonyResult<User> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PonyError::validation("name is required"));
        }
        let email = input.email.trim();
        if !email.contains('@') {
            return Err(PonyError::validation("email is invalid"));
        }
        password::check_policy(&input.password, self.config.min_password_length)
            .map_err(PonyError::validation)?;
        if input.permissions.is_empty() {
            return Err(PonyError::validation("at least one permission is required"));
        }

        match self
            .user_repo
            .get_by_email(tenant.as_uuid(), email)
            .await
        {
            Ok(_) => {
                return Err(PonyError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(PonyError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let permissions = self.resolve_permissions(&input.permissions).await?;

        let user = self
            .user_repo
            .create(CreateUser {
                tenant_id: tenant.as_uuid(),
                name: name.to_string(),
                email: email.to_string(),
                password: input.password,
                permissions,
            })
            .await?;

        info!(
            user_id = %user.id,
            tenant_id = %tenant,
            permissions = ?user.permissions.names(),
            "User registered"
        );

        Ok(user)
    }

    /// Authenticate with email and password and issue a session token.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, tenant: TenantId, input: LoginInput) -> PonyResult<LoginOutput> {
        let user = match self
            .user_repo
            .get_by_email(tenant.as_uuid(), input.email.trim())
            .await
        {
            Ok(user) => user,
            Err(PonyError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(user.id)?;

        info!(user_id = %user.id, tenant_id = %tenant, "User logged in");

        Ok(LoginOutput {
            token,
            expires_in: self.tokens.lifetime_secs(),
        })
    }

    /// Map each requested name to a seeded permission row. Unknown
    /// names are a validation failure.
    async fn resolve_permissions(&self, names: &[String]) -> PonyResult<PermissionSet> {
        let mut set = PermissionSet::new();
        for raw in names {
            let name: PermissionName = raw.trim().parse()?;
            let permission = match self.permission_repo.get_by_name(name).await {
                Ok(permission) => permission,
                Err(PonyError::NotFound { .. }) => {
                    return Err(PonyError::validation(format!("unknown permission: {name}")));
                }
                Err(e) => return Err(e),
            };
            set.insert(permission.name);
        }
        Ok(set)
    }
}
