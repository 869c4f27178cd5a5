//! Dancing Pony HTTP layer: routing, middleware and configuration.

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, RestaurantWritePolicy, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::restaurants::router(state.clone()))
        .nest("/:tenant_id/auth", routes::auth::router(state.clone()))
        .nest("/:tenant_id/dishes", routes::dishes::router(state.clone()));

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api/restaurants", api)
        .nest_service("/uploads", ServeDir::new(&state.image_dir))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware::request_id::propagate,
        ))
        .with_state(state)
}
