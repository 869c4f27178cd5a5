//! Integration tests for RestaurantService.

use pony_cache::{CacheStore, MokaCacheStore, keys};
use pony_core::error::PonyError;
use pony_db::repository::SurrealRestaurantRepository;
use pony_menu::RestaurantService;
use pony_menu::dto::{NewRestaurant, RestaurantPatch};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (
    RestaurantService<SurrealRestaurantRepository<Db>, MokaCacheStore>,
    MokaCacheStore,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pony_db::run_migrations(&db).await.unwrap();

    let cache = MokaCacheStore::default();
    let service = RestaurantService::new(SurrealRestaurantRepository::new(db), cache.clone());
    (service, cache)
}

fn new_restaurant(name: &str) -> NewRestaurant {
    NewRestaurant {
        name: name.into(),
        description: "An inn at the crossroads".into(),
        location: "Bree".into(),
        image_url: "http://img.local/inn.png".into(),
    }
}

#[tokio::test]
async fn create_find_and_list() {
    let (service, _) = setup().await;

    let created = service.create(new_restaurant("The Prancing Pony")).await.unwrap();
    let found = service.find_by_id(created.id).await.unwrap();
    assert_eq!(found, created);

    let list = service.find_all(1, 10).await.unwrap();
    assert_eq!(list.total_items, 1);
    assert_eq!(list.restaurants[0].name, "The Prancing Pony");
}

#[tokio::test]
async fn blank_fields_are_rejected() {
    let (service, _) = setup().await;
    let mut input = new_restaurant("Green Dragon");
    input.location = " ".into();
    let err = service.create(input).await.unwrap_err();
    assert!(matches!(err, PonyError::Validation { .. }));
}

#[tokio::test]
async fn create_clears_cached_lists() {
    let (service, cache) = setup().await;
    service.create(new_restaurant("Green Dragon")).await.unwrap();

    assert_eq!(service.find_all(1, 10).await.unwrap().total_items, 1);
    assert!(cache.get(&keys::restaurants(1, 10)).await.unwrap().is_some());

    service.create(new_restaurant("Golden Perch")).await.unwrap();
    assert!(cache.get(&keys::restaurants(1, 10)).await.unwrap().is_none());
    assert_eq!(service.find_all(1, 10).await.unwrap().total_items, 2);
}

#[tokio::test]
async fn update_and_delete_refresh_point_entry() {
    let (service, _) = setup().await;
    let created = service.create(new_restaurant("Ivy Bush")).await.unwrap();
    service.find_by_id(created.id).await.unwrap();

    let updated = service
        .update(
            created.id,
            RestaurantPatch {
                location: Some("Hobbiton".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.location, "Hobbiton");
    assert_eq!(updated.name, "Ivy Bush");
    assert_eq!(service.find_by_id(created.id).await.unwrap().location, "Hobbiton");

    service.delete(created.id).await.unwrap();
    let err = service.find_by_id(created.id).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));
    assert_eq!(service.find_all(1, 10).await.unwrap().total_items, 0);
}

#[tokio::test]
async fn unknown_restaurant_is_not_found() {
    let (service, _) = setup().await;
    let err = service.find_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));

    let err = service.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));
}
