//! Cache key builders.
//!
//! Every list-family key starts with the prefix returned by the
//! matching `*_prefix` function, so a single prefix delete clears every
//! page of that family.

use pony_core::models::tenant::TenantId;
use uuid::Uuid;

pub fn dish(tenant: TenantId, dish_id: Uuid) -> String {
    format!("dish:{tenant}:{dish_id}")
}

pub fn dishes(tenant: TenantId, page: u64, limit: u64) -> String {
    format!("{}page:{page}:limit:{limit}", dishes_prefix(tenant))
}

pub fn dishes_prefix(tenant: TenantId) -> String {
    format!("dishes:{tenant}:")
}

pub fn dish_search(tenant: TenantId, term: &str, page: u64, limit: u64) -> String {
    format!(
        "{}{term}:page:{page}:limit:{limit}",
        dish_search_prefix(tenant)
    )
}

pub fn dish_search_prefix(tenant: TenantId) -> String {
    format!("dish_search:{tenant}:")
}

pub fn restaurant(id: Uuid) -> String {
    format!("restaurant:{id}")
}

pub fn restaurants(page: u64, limit: u64) -> String {
    format!("{RESTAURANTS_PREFIX}page:{page}:limit:{limit}")
}

pub const RESTAURANTS_PREFIX: &str = "restaurants:";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        let tenant = TenantId(Uuid::nil());
        let dish_id = Uuid::nil();
        assert_eq!(
            dish(tenant, dish_id),
            "dish:00000000-0000-0000-0000-000000000000:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            dishes(tenant, 2, 10),
            "dishes:00000000-0000-0000-0000-000000000000:page:2:limit:10"
        );
        assert_eq!(
            dish_search(tenant, "stew", 1, 10),
            "dish_search:00000000-0000-0000-0000-000000000000:stew:page:1:limit:10"
        );
        assert_eq!(restaurants(1, 10), "restaurants:page:1:limit:10");
    }

    #[test]
    fn list_keys_share_their_prefix() {
        let tenant = TenantId(Uuid::new_v4());
        assert!(dishes(tenant, 3, 5).starts_with(&dishes_prefix(tenant)));
        assert!(dish_search(tenant, "pie", 1, 5).starts_with(&dish_search_prefix(tenant)));
        assert!(restaurants(1, 5).starts_with(RESTAURANTS_PREFIX));
        // Point keys never fall under a list prefix.
        assert!(!dish(tenant, Uuid::new_v4()).starts_with(&dishes_prefix(tenant)));
        assert!(!restaurant(Uuid::new_v4()).starts_with(RESTAURANTS_PREFIX));
    }
}
