//! Dish domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: Uuid,
    /// Owning restaurant, which is also the tenant.
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub created_by: Uuid,
    pub last_updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDish {
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub created_by: Uuid,
}

/// Partial update. `updated_by` is always recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDish {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub updated_by: Uuid,
}

impl UpdateDish {
    pub fn by(user_id: Uuid) -> Self {
        Self {
            name: None,
            description: None,
            price: None,
            image_url: None,
            updated_by: user_id,
        }
    }
}
