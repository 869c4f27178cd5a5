//! Registration and login, scoped to a restaurant.

use axum::extract::State;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::post;
use axum::{Extension, Json, Router};
use pony_auth::{LoginInput, RegisterInput};
use pony_core::models::tenant::TenantId;
use pony_core::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::middleware::{rate_limit, tenant};
use crate::response::{ApiResponse, ok};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(from_fn(tenant::resolve))
        .route_layer(from_fn_with_state(state, rate_limit::limit_by_ip))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub email: String,
    pub permissions: Vec<String>,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            restaurant_id: user.tenant_id,
            permissions: user.permissions.names(),
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenBody {
    pub token: String,
    pub expires_in: u64,
}

async fn register(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<UserBody>>> {
    let user = state
        .auth
        .register(
            tenant,
            RegisterInput {
                name: body.name,
                email: body.email,
                password: body.password,
                permissions: body.permissions,
            },
        )
        .await?;

    Ok(ok("Registration successful", UserBody::from(user)))
}

async fn login(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Json<ApiResponse<TokenBody>>> {
    let output = state
        .auth
        .login(
            tenant,
            LoginInput {
                email: body.email,
                password: body.password,
            },
        )
        .await?;

    Ok(ok(
        "Login successful",
        TokenBody {
            token: output.token,
            expires_in: output.expires_in,
        },
    ))
}
