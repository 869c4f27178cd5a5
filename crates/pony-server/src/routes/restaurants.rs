//! Restaurant routes.
//!
//! Reads are public and limited by client IP. Who may write depends on
//! the configured [`RestaurantWritePolicy`].

use axum::extract::State;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use pony_core::models::tenant::TenantId;
use pony_menu::dto::{NewRestaurant, RestaurantListResponse, RestaurantPatch, RestaurantResponse};

use super::PageParams;
use crate::config::RestaurantWritePolicy;
use crate::error::ApiResult;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::auth::{ADMIN_ONLY, Guard, STAFF, authorize};
use crate::middleware::{rate_limit, tenant};
use crate::response::{ApiResponse, ok};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let list_routes = Router::new()
        .route("/", get(list))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_ip));

    let item_routes = Router::new()
        .route("/:tenant_id", get(show))
        .route_layer(from_fn(tenant::resolve))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_ip));

    let (create_routes, write_routes) = match state.write_policy {
        RestaurantWritePolicy::Protected => (
            Router::new()
                .route("/", post(create))
                .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_user))
                .route_layer(from_fn_with_state(
                    Guard::new(state.clone(), ADMIN_ONLY),
                    authorize,
                )),
            Router::new()
                .route("/:tenant_id", patch(update).delete(remove))
                .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_user))
                .route_layer(from_fn_with_state(Guard::new(state.clone(), STAFF), authorize))
                .route_layer(from_fn(tenant::resolve)),
        ),
        RestaurantWritePolicy::Open => (
            Router::new()
                .route("/", post(create))
                .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_ip)),
            Router::new()
                .route("/:tenant_id", patch(update).delete(remove))
                .route_layer(from_fn(tenant::resolve))
                .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_ip)),
        ),
    };

    list_routes
        .merge(item_routes)
        .merge(create_routes)
        .merge(write_routes)
}

async fn list(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResult<Json<ApiResponse<RestaurantListResponse>>> {
    let restaurants = state
        .restaurants
        .find_all(params.page(), params.limit())
        .await?;
    Ok(ok("Restaurants retrieved successfully", restaurants))
}

async fn show(
    State(state): State<AppState>,
    Extension(restaurant): Extension<TenantId>,
) -> ApiResult<Json<ApiResponse<RestaurantResponse>>> {
    let restaurant = state
        .restaurants
        .find_by_id(restaurant.as_uuid())
        .await?;
    Ok(ok("Restaurant found", restaurant))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewRestaurant>,
) -> ApiResult<Json<ApiResponse<RestaurantResponse>>> {
    let restaurant = state.restaurants.create(body).await?;
    Ok(ok("Restaurant created successfully", restaurant))
}

async fn update(
    State(state): State<AppState>,
    Extension(restaurant): Extension<TenantId>,
    JsonBody(body): JsonBody<RestaurantPatch>,
) -> ApiResult<Json<ApiResponse<RestaurantResponse>>> {
    let restaurant = state
        .restaurants
        .update(restaurant.as_uuid(), body)
        .await?;
    Ok(ok("Restaurant updated successfully", restaurant))
}

async fn remove(
    State(state): State<AppState>,
    Extension(restaurant): Extension<TenantId>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.restaurants.delete(restaurant.as_uuid()).await?;
    Ok(ok("Restaurant deleted successfully", ()))
}
