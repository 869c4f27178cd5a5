//! SurrealDB repository implementations.

mod dish;
mod permission;
mod restaurant;
mod user;

pub use dish::SurrealDishRepository;
pub use permission::SurrealPermissionRepository;
pub use restaurant::SurrealRestaurantRepository;
pub use user::SurrealUserRepository;
