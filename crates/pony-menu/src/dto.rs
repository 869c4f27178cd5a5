//! Request inputs and response bodies for dishes and restaurants.
//!
//! Response types are also the cached representation, so they derive
//! both `Serialize` and `Deserialize`.

use chrono::{DateTime, Utc};
use pony_core::error::{PonyError, PonyResult};
use pony_core::models::dish::Dish;
use pony_core::models::rating::{MAX_SCORE, MIN_SCORE, Rating};
use pony_core::models::restaurant::Restaurant;
use pony_core::repository::PaginatedResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on free-text fields.
pub const MAX_TEXT_LEN: usize = 200;

fn check_text(field: &str, value: &str) -> PonyResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(PonyError::validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(PonyError::validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn check_price(price: f64) -> PonyResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PonyError::validation("price must be greater than 0"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dishes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewDish {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
}

impl NewDish {
    pub fn validate(&self) -> PonyResult<()> {
        check_text("name", &self.name)?;
        check_text("description", &self.description)?;
        check_price(self.price)?;
        if self.image_url.trim().is_empty() {
            return Err(PonyError::validation("image is required"));
        }
        Ok(())
    }
}

/// Partial dish update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct DishPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl DishPatch {
    pub fn validate(&self) -> PonyResult<()> {
        if let Some(name) = &self.name {
            check_text("name", name)?;
        }
        if let Some(description) = &self.description {
            check_text("description", description)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            restaurant_id: dish.restaurant_id,
            name: dish.name,
            description: dish.description,
            price: dish.price,
            image_url: dish.image_url,
            created_at: dish.created_at,
            updated_at: dish.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishListResponse {
    pub dishes: Vec<DishResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl From<PaginatedResult<Dish>> for DishListResponse {
    fn from(page: PaginatedResult<Dish>) -> Self {
        Self {
            current_page: page_number(page.offset, page.limit),
            total_pages: page.total_pages(),
            total_items: page.total,
            dishes: page.items.into_iter().map(DishResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateDish {
    pub rating: i64,
}

impl RateDish {
    /// The score as stored, if it is within the accepted range.
    pub fn score(&self) -> PonyResult<u8> {
        u8::try_from(self.rating)
            .ok()
            .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
            .ok_or_else(|| {
                PonyError::validation(format!(
                    "rating must be between {MIN_SCORE} and {MAX_SCORE}"
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: Uuid,
    pub rating: u8,
    pub dish_id: Uuid,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            rating: rating.score,
            dish_id: rating.dish_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
}

impl NewRestaurant {
    pub fn validate(&self) -> PonyResult<()> {
        check_text("name", &self.name)?;
        check_text("description", &self.description)?;
        check_text("location", &self.location)?;
        check_text("imageUrl", &self.image_url)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}

impl RestaurantPatch {
    pub fn validate(&self) -> PonyResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("location", &self.location),
            ("imageUrl", &self.image_url),
        ] {
            if let Some(value) = value {
                check_text(field, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(r: Restaurant) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            location: r.location,
            image_url: r.image_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantListResponse {
    pub restaurants: Vec<RestaurantResponse>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl From<PaginatedResult<Restaurant>> for RestaurantListResponse {
    fn from(page: PaginatedResult<Restaurant>) -> Self {
        Self {
            current_page: page_number(page.offset, page.limit),
            total_pages: page.total_pages(),
            total_items: page.total,
            restaurants: page
                .items
                .into_iter()
                .map(RestaurantResponse::from)
                .collect(),
        }
    }
}

fn page_number(offset: u64, limit: u64) -> u64 {
    offset / limit.max(1) + 1
}
