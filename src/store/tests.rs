use chrono::Utc;
use qdrant_client::qdrant::{Condition, Filter, Range};
use uuid::Uuid;

use crate::product::{Product, ProductStatus, ProductVariant};

use super::mock::{MockVectorStore, cosine_similarity};
use super::model::{StoredHit, build_payload, product_from_payload};
use super::{StoreError, VectorStore};

fn product(id: &str, name: &str, price: f64, status: ProductStatus) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "apparel".to_string(),
        description: String::new(),
        price,
        currency: "USD".to_string(),
        brand: "Acme".to_string(),
        color: "blue".to_string(),
        size: "M".to_string(),
        material: String::new(),
        style: String::new(),
        gender: String::new(),
        occasion: String::new(),
        image_urls: vec![],
        tags: vec!["denim".to_string()],
        attributes: [("fit".to_string(), "slim".to_string())].into(),
        status,
        created_at: now,
        updated_at: now,
    }
}

fn variant(product_id: &str, text: &str, vector: Vec<f32>) -> ProductVariant {
    ProductVariant {
        id: Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        text: text.to_string(),
        vector,
        generated_at: Utc::now(),
    }
}

#[test]
fn test_payload_round_trip_preserves_product() {
    let original = product("p1", "Blue Jeans", 79.5, ProductStatus::Active);
    let v = variant("p1", "classic blue jeans", vec![0.1, 0.2]);

    let payload = build_payload(&original, &v);
    let restored = product_from_payload(&payload);

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.name, original.name);
    assert_eq!(restored.price, original.price);
    assert_eq!(restored.status, ProductStatus::Active);
    assert_eq!(restored.tags, original.tags);
    assert_eq!(restored.attributes.get("fit").map(String::as_str), Some("slim"));
    assert_eq!(restored.created_at.timestamp(), original.created_at.timestamp());
}

#[test]
fn test_stored_hit_extracts_variant_text() {
    let p = product("p1", "Blue Jeans", 79.5, ProductStatus::Active);
    let v = variant("p1", "classic blue jeans", vec![0.1, 0.2]);
    let payload = build_payload(&p, &v);

    let hit = StoredHit::from_payload(0.83, &payload);
    assert_eq!(hit.variant_text.as_deref(), Some("classic blue jeans"));
    assert_eq!(hit.score, 0.83);
}

#[tokio::test]
async fn test_mock_query_orders_by_cosine_similarity() {
    let store = MockVectorStore::new();
    let p1 = product("p1", "Jeans", 50.0, ProductStatus::Active);
    let p2 = product("p2", "Jacket", 90.0, ProductStatus::Active);

    store
        .upsert_variants(&p1, &[variant("p1", "jeans", vec![1.0, 0.0])])
        .await
        .unwrap();
    store
        .upsert_variants(&p2, &[variant("p2", "jacket", vec![0.0, 1.0])])
        .await
        .unwrap();

    let hits = store
        .query(vec![0.9, 0.1], Filter::default(), 10)
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].product.id, "p1");
    assert!(hits[0].score > hits[1].score);
}

#[tokio::test]
async fn test_mock_query_applies_status_and_range_filters() {
    let store = MockVectorStore::new();
    let active = product("p1", "Jeans", 50.0, ProductStatus::Active);
    let inactive = product("p2", "Jeans", 50.0, ProductStatus::Inactive);
    let pricey = product("p3", "Jeans", 500.0, ProductStatus::Active);

    for p in [&active, &inactive, &pricey] {
        store
            .upsert_variants(p, &[variant(&p.id, "jeans", vec![1.0, 0.0])])
            .await
            .unwrap();
    }

    let filter = Filter::must([
        Condition::matches("status", "active".to_string()),
        Condition::range(
            "price",
            Range {
                gte: Some(0.0),
                lte: Some(100.0),
                ..Range::default()
            },
        ),
    ]);

    let hits = store.query(vec![1.0, 0.0], filter, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].product.id, "p1");
}

#[tokio::test]
async fn test_mock_fetch_and_delete_product() {
    let store = MockVectorStore::new();
    let p = product("p1", "Jeans", 50.0, ProductStatus::Active);
    store
        .upsert_variants(
            &p,
            &[
                variant("p1", "first", vec![1.0, 0.0]),
                variant("p1", "second", vec![0.5, 0.5]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(store.point_count(), 2);
    assert_eq!(store.fetch_product("p1").await.unwrap().name, "Jeans");

    store.delete_product("p1").await.unwrap();
    assert_eq!(store.point_count(), 0);
    assert!(matches!(
        store.fetch_product("p1").await,
        Err(StoreError::ProductNotFound { .. })
    ));
}

#[test]
fn test_cosine_similarity_basics() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
}
