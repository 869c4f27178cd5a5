//! Tenant resolution from a path segment.

use pony_core::models::tenant::TenantId;
use uuid::Uuid;

use crate::error::AuthError;

/// Parse the `{tenantId}` path parameter into a [`TenantId`].
///
/// Surrounding whitespace is not tolerated; the raw value must be a
/// UUID in any of the forms `uuid` accepts.
pub fn resolve_tenant(raw: &str) -> Result<TenantId, AuthError> {
    Uuid::parse_str(raw)
        .map(TenantId)
        .map_err(|_| AuthError::InvalidTenant(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(resolve_tenant(&id.to_string()).unwrap(), TenantId(id));
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "bree", "123", " 6f1c1f8e-0000-0000-0000-000000000000"] {
            assert!(matches!(
                resolve_tenant(raw),
                Err(AuthError::InvalidTenant(_))
            ));
        }
    }
}
