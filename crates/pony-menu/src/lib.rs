//! Dancing Pony menu: dish and restaurant business logic.
//!
//! Services are generic over the repository, cache and image store
//! traits, so this crate has no dependency on the database crate.

mod cached;
pub mod dish;
pub mod dto;
pub mod image;
pub mod restaurant;

pub use dish::DishService;
pub use image::{ImageStore, ImageUpload, LocalImageStore};
pub use restaurant::RestaurantService;
