//! Tenant resolution from the `:tenant_id` path segment.

use std::collections::HashMap;

use axum::extract::{Path, Request};
use axum::middleware::Next;
use axum::response::Response;
use pony_auth::resolve_tenant;
use pony_core::error::PonyError;

use crate::error::ApiError;

pub const TENANT_PARAM: &str = "tenant_id";

/// Resolve the tenant and store it in request extensions. Must only be
/// layered onto routes that carry `:tenant_id`.
pub async fn resolve(
    Path(params): Path<HashMap<String, String>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = params.get(TENANT_PARAM).map(String::as_str).unwrap_or("");
    let tenant = resolve_tenant(raw).map_err(PonyError::from)?;
    req.extensions_mut().insert(tenant);
    Ok(next.run(req).await)
}
