//! Dish routes, all tenant-scoped and authenticated.
//!
//! Reads and ratings are open to every role. The `/admin` routes take
//! multipart forms and require restaurant staff.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use pony_auth::Identity;
use pony_core::error::PonyError;
use pony_core::models::tenant::TenantId;
use pony_menu::ImageUpload;
use pony_menu::dto::{DishListResponse, DishPatch, DishResponse, NewDish, RateDish, RatingResponse};
use serde::Deserialize;
use tracing::debug;

use super::{PageParams, parse_id};
use crate::error::{ApiError, ApiResult};
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::auth::{ANY_ROLE, Guard, STAFF, authorize};
use crate::middleware::{rate_limit, tenant};
use crate::response::{ApiResponse, ok};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list))
        .route("/search", get(search))
        .route("/:dish_id", get(show))
        .route("/:dish_id/rate", post(rate))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_user))
        .route_layer(from_fn_with_state(
            Guard::new(state.clone(), ANY_ROLE),
            authorize,
        ))
        .route_layer(from_fn(tenant::resolve));

    let admin = Router::new()
        .route("/admin", post(create))
        .route("/admin/:dish_id", patch(update).delete(remove))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::limit_by_user))
        .route_layer(from_fn_with_state(Guard::new(state.clone(), STAFF), authorize))
        .route_layer(from_fn(tenant::resolve))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    read.merge(admin)
}

#[derive(Debug, Deserialize)]
struct DishPath {
    dish_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(rename = "searchTerm", default)]
    search_term: String,
    page: Option<u64>,
    limit: Option<u64>,
}

async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResult<Json<ApiResponse<DishListResponse>>> {
    let dishes = state
        .dishes
        .find_all(tenant, params.page(), params.limit())
        .await?;
    Ok(ok("Dishes retrieved successfully", dishes))
}

async fn search(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    QueryParams(params): QueryParams<SearchParams>,
) -> ApiResult<Json<ApiResponse<DishListResponse>>> {
    let paging = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let dishes = state
        .dishes
        .search(tenant, &params.search_term, paging.page(), paging.limit())
        .await?;
    Ok(ok("Dishes retrieved successfully", dishes))
}

async fn show(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Path(path): Path<DishPath>,
) -> ApiResult<Json<ApiResponse<DishResponse>>> {
    let dish_id = parse_id(&path.dish_id, "dish")?;
    let dish = state.dishes.find_by_id(tenant, dish_id).await?;
    Ok(ok("Dish retrieved successfully", dish))
}

async fn rate(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Extension(identity): Extension<Identity>,
    Path(path): Path<DishPath>,
    JsonBody(body): JsonBody<RateDish>,
) -> ApiResult<Json<ApiResponse<RatingResponse>>> {
    let dish_id = parse_id(&path.dish_id, "dish")?;
    let rating = state
        .dishes
        .rate(tenant, identity.user_id, dish_id, body)
        .await?;
    Ok(ok("Dish successfully rated", rating))
}

async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<DishResponse>>> {
    let form = DishForm::read(multipart).await?;

    let (Some(name), Some(description), Some(price), Some(image)) =
        (form.name, form.description, form.price, form.image)
    else {
        return Err(PonyError::validation("missing required fields").into());
    };

    // Reject bad text before the image is stored.
    DishPatch {
        name: Some(name.clone()),
        description: Some(description.clone()),
        price: Some(price),
        image_url: None,
    }
    .validate()?;

    let image_url = state.dishes.upload_image(image).await?;
    let dish = state
        .dishes
        .create(
            tenant,
            identity.user_id,
            NewDish {
                name,
                description,
                price,
                image_url,
            },
        )
        .await?;

    Ok(ok("Dish created successfully", dish))
}

async fn update(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Extension(identity): Extension<Identity>,
    Path(path): Path<DishPath>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<DishResponse>>> {
    let dish_id = parse_id(&path.dish_id, "dish")?;
    let form = DishForm::read(multipart).await?;

    let patch = DishPatch {
        name: form.name,
        description: form.description,
        price: form.price,
        image_url: None,
    };

    let dish = state
        .dishes
        .update_with_image(tenant, identity.user_id, dish_id, patch, form.image)
        .await?;

    Ok(ok("Dish updated successfully", dish))
}

async fn remove(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Extension(identity): Extension<Identity>,
    Path(path): Path<DishPath>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let dish_id = parse_id(&path.dish_id, "dish")?;
    state
        .dishes
        .delete(tenant, identity.user_id, dish_id)
        .await?;
    Ok(ok("Dish deleted successfully", ()))
}

/// Fields of the dish create and update forms. Unknown fields are
/// ignored.
#[derive(Debug, Default)]
struct DishForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    image: Option<ImageUpload>,
}

impl DishForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Self> {
        let mut multipart = multipart
            .map_err(|rejection| ApiError(PonyError::validation(rejection.body_text())))?;

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "name" => form.name = Some(field.text().await.map_err(bad_form)?),
                "description" => form.description = Some(field.text().await.map_err(bad_form)?),
                "price" => {
                    let raw = field.text().await.map_err(bad_form)?;
                    let price = raw
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| ApiError(PonyError::validation("invalid price format")))?;
                    form.price = Some(price);
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(bad_form)?;
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }
}

fn bad_form(err: MultipartError) -> ApiError {
    ApiError(PonyError::validation(format!(
        "failed to parse form data: {}",
        err.body_text()
    )))
}
