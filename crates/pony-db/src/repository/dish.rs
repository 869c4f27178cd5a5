//! SurrealDB implementation of [`DishRepository`].
//!
//! Every query is scoped by `restaurant_id`, which is the tenant id.
//! Soft-deleted dishes (`deleted_at` set) are invisible to reads,
//! updates and repeated deletes.

use chrono::{DateTime, Utc};
use pony_core::error::PonyResult;
use pony_core::models::dish::{CreateDish, Dish, UpdateDish};
use pony_core::models::rating::{CreateRating, Rating};
use pony_core::repository::{DishRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DishRow {
    restaurant_id: String,
    name: String,
    description: String,
    price: f64,
    image_url: String,
    created_by: String,
    last_updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DishRowWithId {
    record_id: String,
    restaurant_id: String,
    name: String,
    description: String,
    price: f64,
    image_url: String,
    created_by: String,
    last_updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

impl DishRow {
    fn into_dish(self, id: Uuid) -> Result<Dish, DbError> {
        Ok(Dish {
            id,
            restaurant_id: parse_uuid("restaurant", &self.restaurant_id)?,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            created_by: parse_uuid("created_by", &self.created_by)?,
            last_updated_by: self
                .last_updated_by
                .as_deref()
                .map(|s| parse_uuid("last_updated_by", s))
                .transpose()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl DishRowWithId {
    fn try_into_dish(self) -> Result<Dish, DbError> {
        let id = parse_uuid("dish", &self.record_id)?;
        DishRow {
            restaurant_id: self.restaurant_id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            created_by: self.created_by,
            last_updated_by: self.last_updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_dish(id)
    }
}

#[derive(Debug, SurrealValue)]
struct RatingRow {
    dish_id: String,
    user_id: String,
    score: i64,
    created_at: DateTime<Utc>,
}

impl RatingRow {
    fn into_rating(self, id: Uuid) -> Result<Rating, DbError> {
        let score = u8::try_from(self.score)
            .map_err(|_| DbError::Decode(format!("score out of range: {}", self.score)))?;
        Ok(Rating {
            id,
            dish_id: parse_uuid("dish", &self.dish_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            score,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Dish repository.
#[derive(Clone)]
pub struct SurrealDishRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDishRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Shared paging query for `list` and `search`. `filter` is appended
    /// to the tenant and soft-delete conditions.
    async fn page(
        &self,
        tenant_id: Uuid,
        filter: Option<(&str, String)>,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Dish>, DbError> {
        let tenant_id_str = tenant_id.to_string();
        let condition = match &filter {
            Some((clause, _)) => format!(
                "restaurant_id = $tenant_id AND deleted_at = NONE AND {clause}"
            ),
            None => "restaurant_id = $tenant_id AND deleted_at = NONE".to_string(),
        };
        let term = filter.map(|(_, term)| term).unwrap_or_default();

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM dish WHERE {condition} GROUP ALL"
            ))
            .bind(("tenant_id", tenant_id_str.clone()))
            .bind(("term", term.clone()))
            .await?;
        let count_rows: Vec<CountRow> = count_result.take(0)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM dish \
                 WHERE {condition} \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("tenant_id", tenant_id_str))
            .bind(("term", term))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await?;

        let rows: Vec<DishRowWithId> = result.take(0)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_dish())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

impl<C: Connection> DishRepository for SurrealDishRepository<C> {
    async fn create(&self, input: CreateDish) -> PonyResult<Dish> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('dish', $id) SET \
                 restaurant_id = $restaurant_id, \
                 name = $name, description = $description, \
                 price = $price, image_url = $image_url, \
                 created_by = $created_by, last_updated_by = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("restaurant_id", input.restaurant_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("price", input.price))
            .bind(("image_url", input.image_url))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("dish", e))?;

        let rows: Vec<DishRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "dish".into(),
            id: id_str,
        })?;

        Ok(row.into_dish(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> PonyResult<Dish> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('dish', $id) \
                 WHERE restaurant_id = $tenant_id AND deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DishRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "dish".into(),
            id: id_str,
        })?;

        Ok(row.into_dish(id)?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateDish) -> PonyResult<Dish> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.image_url.is_some() {
            sets.push("image_url = $image_url");
        }
        sets.push("last_updated_by = $updated_by");
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('dish', $id) SET {} \
             WHERE restaurant_id = $tenant_id AND deleted_at = NONE",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("updated_by", input.updated_by.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(image_url) = input.image_url {
            builder = builder.bind(("image_url", image_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("dish", e))?;

        let rows: Vec<DishRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "dish".into(),
            id: id_str,
        })?;

        Ok(row.into_dish(id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> PonyResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('dish', $id) SET \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE restaurant_id = $tenant_id AND deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<DishRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "dish".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> PonyResult<PaginatedResult<Dish>> {
        Ok(self.page(tenant_id, None, pagination).await?)
    }

    async fn search(
        &self,
        tenant_id: Uuid,
        term: &str,
        pagination: Pagination,
    ) -> PonyResult<PaginatedResult<Dish>> {
        let filter = (
            "string::lowercase(name) CONTAINS $term",
            term.to_lowercase(),
        );
        Ok(self.page(tenant_id, Some(filter), pagination).await?)
    }

    async fn rate(&self, input: CreateRating) -> PonyResult<Rating> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('rating', $id) SET \
                 restaurant_id = $restaurant_id, dish_id = $dish_id, \
                 user_id = $user_id, score = $score",
            )
            .bind(("id", id_str.clone()))
            .bind(("restaurant_id", input.restaurant_id.to_string()))
            .bind(("dish_id", input.dish_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("score", i64::from(input.score)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("rating", e))?;

        let rows: Vec<RatingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "rating".into(),
            id: id_str,
        })?;

        Ok(row.into_rating(id)?)
    }
}
