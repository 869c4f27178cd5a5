//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use pony_auth::{AuthService, Authorizer, SlidingWindowLimiter, TokenService};
use pony_cache::MokaCacheStore;
use pony_db::repository::{
    SurrealDishRepository, SurrealPermissionRepository, SurrealRestaurantRepository,
    SurrealUserRepository,
};
use pony_menu::{DishService, LocalImageStore, RestaurantService};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::config::{RestaurantWritePolicy, ServerConfig};

pub type UserRepo = SurrealUserRepository<Any>;
pub type Auth = AuthService<UserRepo, SurrealPermissionRepository<Any>>;
pub type Dishes = DishService<SurrealDishRepository<Any>, MokaCacheStore, LocalImageStore>;
pub type Restaurants = RestaurantService<SurrealRestaurantRepository<Any>, MokaCacheStore>;

/// Everything a handler or middleware needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub authorizer: Arc<Authorizer<UserRepo>>,
    pub dishes: Arc<Dishes>,
    pub restaurants: Arc<Restaurants>,
    /// Keyed by client IP, for public routes.
    pub ip_limiter: Arc<SlidingWindowLimiter>,
    /// Keyed by subject id, for authenticated routes.
    pub user_limiter: Arc<SlidingWindowLimiter>,
    pub write_policy: RestaurantWritePolicy,
    pub max_upload_bytes: usize,
    /// Served read-only under `/uploads`.
    pub image_dir: PathBuf,
}

impl AppState {
    /// Wire services over an already migrated database.
    pub fn new(db: Surreal<Any>, config: &ServerConfig) -> Self {
        let users = match &config.auth.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let tokens = TokenService::new(&config.auth);
        let cache = MokaCacheStore::new(config.cache_ttl, config.cache_max_entries);
        let images = LocalImageStore::new(config.image_dir.clone(), config.image_base_url.clone());

        let limiter =
            || SlidingWindowLimiter::new(config.rate_limit_window, config.rate_limit_max_requests);

        Self {
            auth: Arc::new(AuthService::new(
                users.clone(),
                SurrealPermissionRepository::new(db.clone()),
                tokens.clone(),
                config.auth.clone(),
            )),
            authorizer: Arc::new(Authorizer::new(tokens, users)),
            dishes: Arc::new(DishService::new(
                SurrealDishRepository::new(db.clone()),
                cache.clone(),
                images,
            )),
            restaurants: Arc::new(RestaurantService::new(
                SurrealRestaurantRepository::new(db),
                cache,
            )),
            ip_limiter: Arc::new(limiter()),
            user_limiter: Arc::new(limiter()),
            write_policy: config.restaurant_write_policy,
            max_upload_bytes: config.max_upload_bytes,
            image_dir: config.image_dir.clone(),
        }
    }
}
