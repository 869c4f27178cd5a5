//! Dish rating model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted score.
pub const MIN_SCORE: u8 = 1;
/// Highest accepted score.
pub const MAX_SCORE: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub user_id: Uuid,
    pub score: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRating {
    pub restaurant_id: Uuid,
    pub dish_id: Uuid,
    pub user_id: Uuid,
    pub score: u8,
}
