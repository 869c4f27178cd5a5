//! Authorization pipeline as middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use pony_auth::bearer_token;
use pony_core::models::permission::PermissionName;
use pony_core::models::tenant::TenantId;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Any authenticated role.
pub const ANY_ROLE: &[PermissionName] = &[
    PermissionName::Customer,
    PermissionName::Restaurant,
    PermissionName::Admin,
];

/// Restaurant staff and admins.
pub const STAFF: &[PermissionName] = &[PermissionName::Restaurant, PermissionName::Admin];

pub const ADMIN_ONLY: &[PermissionName] = &[PermissionName::Admin];

/// Middleware state: the app plus the permissions a route requires.
#[derive(Clone)]
pub struct Guard {
    state: AppState,
    required: &'static [PermissionName],
}

impl Guard {
    pub fn new(state: AppState, required: &'static [PermissionName]) -> Self {
        Self { state, required }
    }
}

/// Run the pipeline and insert the resulting
/// [`Identity`](pony_auth::Identity) into request extensions.
///
/// The tenant check applies when tenant resolution ran earlier in the
/// stack; otherwise it is skipped.
pub async fn authorize(
    State(guard): State<Guard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let tenant = req.extensions().get::<TenantId>().copied();

    let identity = guard
        .state
        .authorizer
        .authorize(bearer_token(header.as_deref()), tenant, guard.required)
        .await?;

    debug!(
        user_id = %identity.user_id,
        tenant_id = %identity.tenant_id,
        "Request authorized"
    );

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
