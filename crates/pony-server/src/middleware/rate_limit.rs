//! Admission control keyed by client IP or by authenticated user.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use pony_auth::Identity;
use pony_core::error::PonyError;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// First `X-Forwarded-For` entry, else the peer address, else
/// `"unknown"`.
pub fn client_ip(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into())
}

pub async fn limit_by_ip(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&req);
    if !state.ip_limiter.check(&ip).is_allowed() {
        warn!(client_ip = %ip, "Rate limit exceeded");
        return Err(PonyError::RateLimited.into());
    }
    Ok(next.run(req).await)
}

/// Must run after [`authorize`](super::auth::authorize).
pub async fn limit_by_user(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user_id) = req.extensions().get::<Identity>().map(|i| i.user_id) else {
        return Err(PonyError::Internal("user rate limit ran without an identity".into()).into());
    };

    if !state.user_limiter.check(&user_id.to_string()).is_allowed() {
        warn!(user_id = %user_id, "Rate limit exceeded");
        return Err(PonyError::RateLimited.into());
    }
    Ok(next.run(req).await)
}
