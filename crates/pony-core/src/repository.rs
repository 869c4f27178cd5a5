//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation.

use uuid::Uuid;

use crate::error::{PonyError, PonyResult};
use crate::models::{
    dish::{CreateDish, Dish, UpdateDish},
    permission::{Permission, PermissionName},
    rating::{CreateRating, Rating},
    restaurant::{CreateRestaurant, Restaurant, UpdateRestaurant},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    /// Largest page size a caller may request.
    pub const MAX_LIMIT: u64 = 100;

    /// Build from a 1-based page number. Page 0 becomes 1 and limit is
    /// kept within `1..=MAX_LIMIT`. A page whose offset does not fit a
    /// signed 64-bit `START` is a validation error.
    pub fn page(page: u64, limit: u64) -> PonyResult<Self> {
        let page = page.max(1);
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let offset = (page - 1)
            .checked_mul(limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| PonyError::validation("page is out of range"))?;
        Ok(Self { offset, limit })
    }

    /// The 1-based page number this window starts on.
    pub fn page_number(&self) -> u64 {
        self.offset / self.limit.max(1) + 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 10,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    /// Ceiling of `total / limit`; zero when there is nothing to page.
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

// ---------------------------------------------------------------------------
// Global scope
// ---------------------------------------------------------------------------

/// Read access to the fixed permission table.
pub trait PermissionRepository: Send + Sync {
    fn get_by_name(
        &self,
        name: PermissionName,
    ) -> impl Future<Output = PonyResult<Permission>> + Send;
    fn list(&self) -> impl Future<Output = PonyResult<Vec<Permission>>> + Send;
}

pub trait RestaurantRepository: Send + Sync {
    fn create(
        &self,
        input: CreateRestaurant,
    ) -> impl Future<Output = PonyResult<Restaurant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PonyResult<Restaurant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRestaurant,
    ) -> impl Future<Output = PonyResult<Restaurant>> + Send;
    /// Soft-delete: sets `deleted_at`.
    fn delete(&self, id: Uuid) -> impl Future<Output = PonyResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PonyResult<PaginatedResult<Restaurant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

/// The credential store.
pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the (tenant, email) pair is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = PonyResult<User>> + Send;
    /// Lookup by subject id alone. The caller decides whether the
    /// user's tenant is acceptable.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PonyResult<User>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = PonyResult<User>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = PonyResult<User>> + Send;
}

pub trait DishRepository: Send + Sync {
    fn create(&self, input: CreateDish) -> impl Future<Output = PonyResult<Dish>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = PonyResult<Dish>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDish,
    ) -> impl Future<Output = PonyResult<Dish>> + Send;
    /// Soft-delete: sets `deleted_at`.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = PonyResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PonyResult<PaginatedResult<Dish>>> + Send;
    /// Case-insensitive substring match on dish name.
    fn search(
        &self,
        tenant_id: Uuid,
        term: &str,
        pagination: Pagination,
    ) -> impl Future<Output = PonyResult<PaginatedResult<Dish>>> + Send;
    fn rate(&self, input: CreateRating) -> impl Future<Output = PonyResult<Rating>> + Send;
}
