//! Restaurant domain model.
//!
//! A restaurant is also a tenant: its id scopes the users and dishes
//! that belong to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRestaurant {
    pub name: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
}

/// Fields that can be updated on an existing restaurant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRestaurant {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
}
