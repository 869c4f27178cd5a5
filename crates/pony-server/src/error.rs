//! Mapping of domain errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pony_core::error::PonyError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A [`PonyError`] on its way out as a `{"error": ...}` response.
#[derive(Debug)]
pub struct ApiError(pub PonyError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PonyError::Validation { .. } | PonyError::InvalidTenant(_) => StatusCode::BAD_REQUEST,
            PonyError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            PonyError::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            PonyError::NotFound { .. } => StatusCode::NOT_FOUND,
            PonyError::AlreadyExists { .. } => StatusCode::CONFLICT,
            PonyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            PonyError::Database(_)
            | PonyError::Cache(_)
            | PonyError::Storage(_)
            | PonyError::Crypto(_)
            | PonyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures never leak detail.
    fn message(&self) -> String {
        match &self.0 {
            PonyError::Validation { message } => message.clone(),
            PonyError::InvalidTenant(_) => "invalid restaurant id".into(),
            PonyError::AuthenticationFailed { reason } => reason.clone(),
            PonyError::AuthorizationDenied { reason } => reason.clone(),
            PonyError::NotFound { entity, .. } => format!("{entity} not found"),
            PonyError::AlreadyExists { entity } => format!("{entity} already exists"),
            PonyError::RateLimited => "Too many requests. Please try again later.".into(),
            _ => "Internal server error".into(),
        }
    }
}

impl From<PonyError> for ApiError {
    fn from(err: PonyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        let body = Json(ErrorBody {
            error: self.message(),
        });
        (status, body).into_response()
    }
}
