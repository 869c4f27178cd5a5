//! Tenant-scoped dish management, search and rating.

use pony_cache::{CacheStore, keys};
use pony_core::error::{PonyError, PonyResult};
use pony_core::models::dish::{CreateDish, UpdateDish};
use pony_core::models::rating::CreateRating;
use pony_core::models::tenant::TenantId;
use pony_core::repository::{DishRepository, Pagination};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cached::{invalidate, read_through};
use crate::dto::{DishListResponse, DishPatch, DishResponse, NewDish, RateDish, RatingResponse};
use crate::image::{ImageStore, ImageUpload};

/// Dish operations for a single tenant at a time.
///
/// Reads go through the cache; writes invalidate the dish's own key and
/// every cached list and search page of its tenant.
pub struct DishService<R: DishRepository, C: CacheStore, I: ImageStore> {
    repo: R,
    cache: C,
    images: I,
}

impl<R: DishRepository, C: CacheStore, I: ImageStore> DishService<R, C, I> {
    pub fn new(repo: R, cache: C, images: I) -> Self {
        Self {
            repo,
            cache,
            images,
        }
    }

    pub async fn create(
        &self,
        tenant: TenantId,
        user_id: Uuid,
        input: NewDish,
    ) -> PonyResult<DishResponse> {
        input.validate()?;

        let dish = self
            .repo
            .create(CreateDish {
                restaurant_id: tenant.as_uuid(),
                name: input.name.trim().to_string(),
                description: input.description.trim().to_string(),
                price: input.price,
                image_url: input.image_url,
                created_by: user_id,
            })
            .await?;

        self.invalidate_lists(tenant).await;

        info!(
            dish_id = %dish.id,
            tenant_id = %tenant,
            user_id = %user_id,
            "Dish created"
        );

        Ok(dish.into())
    }

    pub async fn update(
        &self,
        tenant: TenantId,
        user_id: Uuid,
        dish_id: Uuid,
        patch: DishPatch,
    ) -> PonyResult<DishResponse> {
        patch.validate()?;

        let dish = self
            .repo
            .update(
                tenant.as_uuid(),
                dish_id,
                UpdateDish {
                    name: patch.name.map(|s| s.trim().to_string()),
                    description: patch.description.map(|s| s.trim().to_string()),
                    price: patch.price,
                    image_url: patch.image_url,
                    updated_by: user_id,
                },
            )
            .await?;

        invalidate(&self.cache, &[keys::dish(tenant, dish_id)], &[]).await;
        self.invalidate_lists(tenant).await;

        info!(
            dish_id = %dish_id,
            tenant_id = %tenant,
            user_id = %user_id,
            "Dish updated"
        );

        Ok(dish.into())
    }

    /// Update a dish, storing a replacement image when one is given.
    ///
    /// The dish must be visible to `tenant` before the image is stored.
    /// If the update still fails, the stored image is removed again.
    pub async fn update_with_image(
        &self,
        tenant: TenantId,
        user_id: Uuid,
        dish_id: Uuid,
        mut patch: DishPatch,
        image: Option<ImageUpload>,
    ) -> PonyResult<DishResponse> {
        let Some(image) = image else {
            return self.update(tenant, user_id, dish_id, patch).await;
        };

        patch.validate()?;
        self.repo.get_by_id(tenant.as_uuid(), dish_id).await?;

        let url = self.images.upload(image).await?;
        patch.image_url = Some(url.clone());

        match self.update(tenant, user_id, dish_id, patch).await {
            Ok(dish) => Ok(dish),
            Err(e) => {
                if let Err(cleanup) = self.images.remove(&url).await {
                    warn!(url = %url, error = %cleanup, "Failed to remove orphaned image");
                }
                Err(e)
            }
        }
    }

    /// Soft-delete a dish.
    pub async fn delete(&self, tenant: TenantId, user_id: Uuid, dish_id: Uuid) -> PonyResult<()> {
        self.repo.delete(tenant.as_uuid(), dish_id).await?;

        invalidate(&self.cache, &[keys::dish(tenant, dish_id)], &[]).await;
        self.invalidate_lists(tenant).await;

        info!(
            dish_id = %dish_id,
            tenant_id = %tenant,
            user_id = %user_id,
            "Dish deleted"
        );

        Ok(())
    }

    pub async fn find_by_id(&self, tenant: TenantId, dish_id: Uuid) -> PonyResult<DishResponse> {
        read_through(&self.cache, keys::dish(tenant, dish_id), || async {
            let dish = self.repo.get_by_id(tenant.as_uuid(), dish_id).await?;
            Ok(DishResponse::from(dish))
        })
        .await
    }

    pub async fn find_all(
        &self,
        tenant: TenantId,
        page: u64,
        limit: u64,
    ) -> PonyResult<DishListResponse> {
        let pagination = Pagination::page(page, limit)?;
        let key = keys::dishes(tenant, pagination.page_number(), pagination.limit);

        read_through(&self.cache, key, || async {
            let result = self.repo.list(tenant.as_uuid(), pagination).await?;
            Ok(DishListResponse::from(result))
        })
        .await
    }

    /// Case-insensitive substring search on dish names.
    pub async fn search(
        &self,
        tenant: TenantId,
        term: &str,
        page: u64,
        limit: u64,
    ) -> PonyResult<DishListResponse> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Err(PonyError::validation("search term is required"));
        }

        let pagination = Pagination::page(page, limit)?;
        let key = keys::dish_search(tenant, &term, pagination.page_number(), pagination.limit);

        read_through(&self.cache, key, || async {
            let result = self
                .repo
                .search(tenant.as_uuid(), &term, pagination)
                .await?;
            Ok(DishListResponse::from(result))
        })
        .await
    }

    /// Record a rating. The dish must exist in `tenant`.
    pub async fn rate(
        &self,
        tenant: TenantId,
        user_id: Uuid,
        dish_id: Uuid,
        input: RateDish,
    ) -> PonyResult<RatingResponse> {
        let score = input.score()?;

        self.repo.get_by_id(tenant.as_uuid(), dish_id).await?;

        let rating = self
            .repo
            .rate(CreateRating {
                restaurant_id: tenant.as_uuid(),
                dish_id,
                user_id,
                score,
            })
            .await?;

        info!(
            dish_id = %dish_id,
            tenant_id = %tenant,
            user_id = %user_id,
            score,
            "Dish rated"
        );

        Ok(rating.into())
    }

    /// Store an image and return its public URL.
    pub async fn upload_image(&self, upload: ImageUpload) -> PonyResult<String> {
        self.images.upload(upload).await
    }

    async fn invalidate_lists(&self, tenant: TenantId) {
        invalidate(
            &self.cache,
            &[],
            &[keys::dishes_prefix(tenant), keys::dish_search_prefix(tenant)],
        )
        .await;
    }
}
