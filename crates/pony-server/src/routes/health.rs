use axum::Json;
use serde::Serialize;

use crate::response::{ApiResponse, ok};

#[derive(Serialize)]
pub struct HealthBody {
    pub version: &'static str,
}

pub async fn health() -> Json<ApiResponse<HealthBody>> {
    ok(
        "Service is healthy",
        HealthBody {
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}
