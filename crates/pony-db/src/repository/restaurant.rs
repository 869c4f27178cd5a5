//! SurrealDB implementation of [`RestaurantRepository`].
//!
//! Restaurants are never physically removed. `delete` stamps
//! `deleted_at` and every read filters on `deleted_at = NONE`.

use chrono::{DateTime, Utc};
use pony_core::error::PonyResult;
use pony_core::models::restaurant::{CreateRestaurant, Restaurant, UpdateRestaurant};
use pony_core::repository::{PaginatedResult, Pagination, RestaurantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RestaurantRow {
    name: String,
    description: String,
    location: String,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RestaurantRowWithId {
    record_id: String,
    name: String,
    description: String,
    location: String,
    image_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RestaurantRow {
    fn into_restaurant(self, id: Uuid) -> Restaurant {
        Restaurant {
            id,
            name: self.name,
            description: self.description,
            location: self.location,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RestaurantRowWithId {
    fn try_into_restaurant(self) -> Result<Restaurant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Restaurant {
            id,
            name: self.name,
            description: self.description,
            location: self.location,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Restaurant repository.
#[derive(Clone)]
pub struct SurrealRestaurantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRestaurantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RestaurantRepository for SurrealRestaurantRepository<C> {
    async fn create(&self, input: CreateRestaurant) -> PonyResult<Restaurant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('restaurant', $id) SET \
                 name = $name, description = $description, \
                 location = $location, image_url = $image_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("location", input.location))
            .bind(("image_url", input.image_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("restaurant", e))?;

        let rows: Vec<RestaurantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "restaurant".into(),
            id: id_str,
        })?;

        Ok(row.into_restaurant(id))
    }

    async fn get_by_id(&self, id: Uuid) -> PonyResult<Restaurant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('restaurant', $id) \
                 WHERE deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RestaurantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "restaurant".into(),
            id: id_str,
        })?;

        Ok(row.into_restaurant(id))
    }

    async fn update(&self, id: Uuid, input: UpdateRestaurant) -> PonyResult<Restaurant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.image_url.is_some() {
            sets.push("image_url = $image_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('restaurant', $id) SET {} \
             WHERE deleted_at = NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(image_url) = input.image_url {
            builder = builder.bind(("image_url", image_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("restaurant", e))?;

        let rows: Vec<RestaurantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "restaurant".into(),
            id: id_str,
        })?;

        Ok(row.into_restaurant(id))
    }

    async fn delete(&self, id: Uuid) -> PonyResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('restaurant', $id) SET \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<RestaurantRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "restaurant".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> PonyResult<PaginatedResult<Restaurant>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM restaurant \
                 WHERE deleted_at = NONE GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM restaurant \
                 WHERE deleted_at = NONE \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RestaurantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_restaurant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
