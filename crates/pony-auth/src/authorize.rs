//! The request authorization pipeline.
//!
//! Stages run strictly in order and the first failure wins:
//! bearer presence, token verification, identity lookup, tenant scope,
//! permission check. The result is an [`Identity`] that handlers can
//! trust without re-checking.

use pony_core::error::{PonyError, PonyResult};
use pony_core::models::permission::{PermissionName, PermissionSet};
use pony_core::models::tenant::TenantId;
use pony_core::repository::UserRepository;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;
use crate::token::TokenService;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub email: String,
    pub permissions: PermissionSet,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.permissions.is_admin()
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for any
/// other scheme or an empty token.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Runs the authorization pipeline against a user store.
#[derive(Clone)]
pub struct Authorizer<U: UserRepository> {
    tokens: TokenService,
    users: U,
}

impl<U: UserRepository> Authorizer<U> {
    pub fn new(tokens: TokenService, users: U) -> Self {
        Self { tokens, users }
    }

    /// Authorize a request.
    ///
    /// `tenant` is `None` for routes that are not tenant-scoped, which
    /// skips the tenant check. An empty `required` slice admits any
    /// authenticated identity.
    pub async fn authorize(
        &self,
        bearer: Option<&str>,
        tenant: Option<TenantId>,
        required: &[PermissionName],
    ) -> PonyResult<Identity> {
        let token = bearer.ok_or(AuthError::MissingToken)?;

        let user_id = self.tokens.verify(token)?;

        let user = match self.users.get_by_id(user_id).await {
            Ok(user) => user,
            Err(PonyError::NotFound { .. }) => return Err(AuthError::UnknownSubject.into()),
            Err(e) => return Err(e),
        };

        let identity = Identity {
            user_id: user.id,
            tenant_id: TenantId(user.tenant_id),
            email: user.email,
            permissions: user.permissions,
        };

        if let Some(tenant) = tenant {
            if tenant != identity.tenant_id && !identity.is_admin() {
                debug!(
                    user_id = %identity.user_id,
                    user_tenant = %identity.tenant_id,
                    tenant_id = %tenant,
                    "Cross-tenant access denied"
                );
                return Err(AuthError::TenantMismatch.into());
            }
        }

        if !identity.permissions.satisfies_any(required) {
            debug!(
                user_id = %identity.user_id,
                "Required permission not held"
            );
            return Err(AuthError::InsufficientPermissions.into());
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token(Some("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(Some("bearer   abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
