//! Restaurant service.

use pony_cache::{CacheStore, keys};
use pony_core::error::PonyResult;
use pony_core::models::restaurant::{CreateRestaurant, UpdateRestaurant};
use pony_core::repository::{Pagination, RestaurantRepository};
use tracing::info;
use uuid::Uuid;

use crate::cached::{invalidate, read_through};
use crate::dto::{NewRestaurant, RestaurantListResponse, RestaurantPatch, RestaurantResponse};

pub struct RestaurantService<R: RestaurantRepository, C: CacheStore> {
    repo: R,
    cache: C,
}

impl<R: RestaurantRepository, C: CacheStore> RestaurantService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    pub async fn create(&self, input: NewRestaurant) -> PonyResult<RestaurantResponse> {
        input.validate()?;

        let restaurant = self
            .repo
            .create(CreateRestaurant {
                name: input.name.trim().to_string(),
                description: input.description.trim().to_string(),
                location: input.location.trim().to_string(),
                image_url: input.image_url.trim().to_string(),
            })
            .await?;

        invalidate(&self.cache, &[], &[keys::RESTAURANTS_PREFIX.to_string()]).await;

        info!(restaurant_id = %restaurant.id, "Restaurant created");

        Ok(restaurant.into())
    }

    pub async fn update(&self, id: Uuid, patch: RestaurantPatch) -> PonyResult<RestaurantResponse> {
        patch.validate()?;

        let restaurant = self
            .repo
            .update(
                id,
                UpdateRestaurant {
                    name: patch.name.map(|s| s.trim().to_string()),
                    description: patch.description.map(|s| s.trim().to_string()),
                    location: patch.location.map(|s| s.trim().to_string()),
                    image_url: patch.image_url.map(|s| s.trim().to_string()),
                },
            )
            .await?;

        invalidate(
            &self.cache,
            &[keys::restaurant(id)],
            &[keys::RESTAURANTS_PREFIX.to_string()],
        )
        .await;

        info!(restaurant_id = %id, "Restaurant updated");

        Ok(restaurant.into())
    }

    /// Soft-delete a restaurant.
    pub async fn delete(&self, id: Uuid) -> PonyResult<()> {
        self.repo.delete(id).await?;

        invalidate(
            &self.cache,
            &[keys::restaurant(id)],
            &[keys::RESTAURANTS_PREFIX.to_string()],
        )
        .await;

        info!(restaurant_id = %id, "Restaurant deleted");

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> PonyResult<RestaurantResponse> {
        read_through(&self.cache, keys::restaurant(id), || async {
            let restaurant = self.repo.get_by_id(id).await?;
            Ok(RestaurantResponse::from(restaurant))
        })
        .await
    }

    pub async fn find_all(&self, page: u64, limit: u64) -> PonyResult<RestaurantListResponse> {
        let pagination = Pagination::page(page, limit)?;
        let key = keys::restaurants(pagination.page_number(), pagination.limit);

        read_through(&self.cache, key, || async {
            let result = self.repo.list(pagination).await?;
            Ok(RestaurantListResponse::from(result))
        })
        .await
    }
}
