//! Integration tests for Restaurant repository using in-memory SurrealDB.

use pony_core::error::PonyError;
use pony_core::models::restaurant::{CreateRestaurant, UpdateRestaurant};
use pony_core::repository::{Pagination, RestaurantRepository};
use pony_db::repository::SurrealRestaurantRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealRestaurantRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pony_db::run_migrations(&db).await.unwrap();
    SurrealRestaurantRepository::new(db)
}

fn prancing_pony() -> CreateRestaurant {
    CreateRestaurant {
        name: "The Prancing Pony".into(),
        description: "Inn and tavern".into(),
        location: "Bree".into(),
        image_url: "https://img.example/pony.png".into(),
    }
}

#[tokio::test]
async fn create_and_get_restaurant() {
    let repo = setup().await;
    let created = repo.create(prancing_pony()).await.unwrap();
    assert_eq!(created.name, "The Prancing Pony");

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.location, "Bree");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let repo = setup().await;
    let created = repo.create(prancing_pony()).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateRestaurant {
                location: Some("Bree, East Road".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.location, "Bree, East Road");
    assert_eq!(updated.name, created.name);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn soft_deleted_restaurant_disappears() {
    let repo = setup().await;
    let created = repo.create(prancing_pony()).await.unwrap();

    repo.delete(created.id).await.unwrap();

    let err = repo.get_by_id(created.id).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));

    let err = repo.delete(created.id).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));

    let err = repo
        .update(created.id, UpdateRestaurant::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));

    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_is_paginated() {
    let repo = setup().await;
    for i in 0..3 {
        repo.create(CreateRestaurant {
            name: format!("Inn {i}"),
            ..prancing_pony()
        })
        .await
        .unwrap();
    }

    let first = repo.list(Pagination::page(1, 2).unwrap()).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.total_pages(), 2);

    let second = repo.list(Pagination::page(2, 2).unwrap()).await.unwrap();
    assert_eq!(second.items.len(), 1);
}

#[tokio::test]
async fn missing_restaurant_is_not_found() {
    let repo = setup().await;
    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PonyError::NotFound { .. }));
}
