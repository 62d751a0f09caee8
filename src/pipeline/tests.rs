use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::embedding::{EmbeddingCache, MockEmbedder};
use crate::llm::MockChatBackend;
use crate::product::{ProductStatus, ProductVariant};
use crate::store::{MockVectorStore, StoreError};
use crate::variants::VariantError;

const DIM: usize = 8;

fn pipeline(
    chat: MockChatBackend,
    store: MockVectorStore,
) -> SearchPipeline<MockChatBackend, MockEmbedder, MockVectorStore> {
    let parser = IntentParser::new(chat.clone(), "chat-model", 1000);
    let generator = VariantGenerator::new(chat, "chat-model", 1500);
    let embedder = CachedEmbedder::new(MockEmbedder::new(DIM), Arc::new(EmbeddingCache::new()));
    SearchPipeline::new(parser, generator, embedder, store, PipelineOptions::default())
}

fn product(id: &str, name: &str, color: &str) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "牛仔裤".to_string(),
        description: String::new(),
        price: 199.0,
        currency: "CNY".to_string(),
        brand: String::new(),
        color: color.to_string(),
        size: String::new(),
        material: String::new(),
        style: String::new(),
        gender: String::new(),
        occasion: String::new(),
        image_urls: vec![],
        tags: vec![],
        attributes: Default::default(),
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

async fn seed(store: &MockVectorStore, product: &Product, texts: &[&str]) {
    let embedder = MockEmbedder::new(DIM);
    let variants: Vec<ProductVariant> = texts
        .iter()
        .map(|text| ProductVariant {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            text: text.to_string(),
            vector: embedder.vector_for(text),
            generated_at: Utc::now(),
        })
        .collect();
    store.upsert_variants(product, &variants).await.unwrap();
}

#[tokio::test]
async fn test_search_survives_parse_failure() {
    let chat = MockChatBackend::new();
    chat.push_error(500, "parser endpoint down");

    let store = MockVectorStore::new();
    seed(&store, &product("p1", "蓝色牛仔裤", "蓝色"), &["蓝色牛仔裤"]).await;

    let pipeline = pipeline(chat, store);
    let outcome = pipeline.search("蓝色牛仔裤", None).await.unwrap();

    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.intent.product_type.as_deref(), Some("蓝色牛仔裤"));
    assert_eq!(outcome.results[0].match_reason, "high semantic match");
    assert_eq!(outcome.results[0].product.id, "p1");
}

#[tokio::test]
async fn test_search_applies_enhanced_color_filter() {
    let chat = MockChatBackend::new();
    chat.push_function_call(
        "extract_product_intent",
        r#"{"product_type": "牛仔服", "color": "红"}"#,
    );

    let store = MockVectorStore::new();
    seed(&store, &product("red", "红色牛仔裤", "红色"), &["牛仔裤"]).await;
    seed(&store, &product("blue", "蓝色牛仔裤", "蓝色"), &["牛仔裤"]).await;

    let pipeline = pipeline(chat, store);
    let outcome = pipeline.search("红色的牛仔服", None).await.unwrap();

    // 牛仔服 is normalized to 牛仔裤 and 红 to 红色 before filtering.
    assert_eq!(outcome.intent.product_type.as_deref(), Some("牛仔裤"));
    assert_eq!(outcome.intent.color.as_deref(), Some("红色"));
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.results[0].product.id, "red");
    assert!(outcome.results[0].match_reason.contains("color match"));
}

#[tokio::test]
async fn test_search_excludes_inactive_products() {
    let chat = MockChatBackend::new();
    chat.push_error(500, "down");

    let store = MockVectorStore::new();
    let mut inactive = product("p1", "牛仔裤", "蓝色");
    inactive.status = ProductStatus::Inactive;
    seed(&store, &inactive, &["牛仔裤"]).await;

    let pipeline = pipeline(chat, store);
    let outcome = pipeline.search("牛仔裤", None).await.unwrap();
    assert_eq!(outcome.total, 0);
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let pipeline = pipeline(MockChatBackend::new(), MockVectorStore::new());
    let result = pipeline.search("   ", None).await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest { .. })));
}

#[tokio::test]
async fn test_create_product_indexes_variants() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic blue jeans", "stretch jeans for travel", "slim fit jeans"]"#);

    let store = MockVectorStore::new();
    let pipeline = pipeline(chat, store.clone());

    let draft = ProductDraft {
        name: "Blue Jeans".to_string(),
        category: "jeans".to_string(),
        description: String::new(),
        price: 59.9,
        currency: "USD".to_string(),
        brand: String::new(),
        color: "blue".to_string(),
        size: String::new(),
        material: String::new(),
        style: String::new(),
        gender: String::new(),
        occasion: String::new(),
        image_urls: vec![],
        tags: vec![],
        attributes: Default::default(),
    };

    let created = pipeline.create_product(draft).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.status, ProductStatus::Active);
    assert_eq!(store.point_count(), 3);

    let fetched = pipeline.get_product(&created.id).await.unwrap();
    assert_eq!(fetched.name, "Blue Jeans");
}

#[tokio::test]
async fn test_create_product_rejects_negative_price() {
    let pipeline = pipeline(MockChatBackend::new(), MockVectorStore::new());
    let draft = ProductDraft {
        name: "Broken".to_string(),
        category: "jeans".to_string(),
        description: String::new(),
        price: -1.0,
        currency: "USD".to_string(),
        brand: String::new(),
        color: String::new(),
        size: String::new(),
        material: String::new(),
        style: String::new(),
        gender: String::new(),
        occasion: String::new(),
        image_urls: vec![],
        tags: vec![],
        attributes: Default::default(),
    };

    let result = pipeline.create_product(draft).await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest { .. })));
}

#[tokio::test]
async fn test_batch_import_isolates_failures() {
    let chat = MockChatBackend::new();
    // One generation call per item, in order. The second item's call fails.
    chat.push_text(r#"["classic red shirt", "red shirt for summer", "soft red shirt"]"#);
    chat.push_error(500, "generation endpoint down");
    chat.push_text(r#"["warm wool scarf", "wool scarf for winter", "long wool scarf"]"#);

    let store = MockVectorStore::new();
    let pipeline = pipeline(chat, store.clone());

    let draft = |name: &str, category: &str| ProductDraft {
        name: name.to_string(),
        category: category.to_string(),
        description: String::new(),
        price: 20.0,
        currency: "USD".to_string(),
        brand: String::new(),
        color: String::new(),
        size: String::new(),
        material: String::new(),
        style: String::new(),
        gender: String::new(),
        occasion: String::new(),
        image_urls: vec![],
        tags: vec![],
        attributes: Default::default(),
    };

    let report = pipeline
        .batch_import(vec![
            draft("Red Shirt", "shirt"),
            draft("Green Hat", "hat"),
            draft("Wool Scarf", "scarf"),
        ])
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.success, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].index, 1);
    assert_eq!(report.errors[0].product, "Green Hat");
    assert!(!report.process_id.is_empty());

    // 3 variants each for the two successful items.
    assert_eq!(store.point_count(), 6);
}

#[tokio::test]
async fn test_batch_import_rejects_empty_batch() {
    let pipeline = pipeline(MockChatBackend::new(), MockVectorStore::new());
    let result = pipeline.batch_import(vec![]).await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest { .. })));
}

#[tokio::test]
async fn test_delete_unknown_product_is_an_error() {
    let pipeline = pipeline(MockChatBackend::new(), MockVectorStore::new());
    let result = pipeline.delete_product("missing").await;
    assert!(matches!(
        result,
        Err(PipelineError::Store(StoreError::ProductNotFound { .. }))
    ));
}

#[tokio::test]
async fn test_update_product_reindexes_variants() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["dark denim jeans", "jeans in a darker wash"]"#);

    let store = MockVectorStore::new();
    seed(
        &store,
        &product("p1", "blue jeans", "蓝色"),
        &["old variant one", "old variant two", "old variant three"],
    )
    .await;

    let pipeline = pipeline(chat, store.clone());
    let patch = ProductPatch {
        name: Some("dark jeans".to_string()),
        ..ProductPatch::default()
    };

    let updated = pipeline.update_product("p1", patch).await.unwrap();
    assert_eq!(updated.name, "dark jeans");

    // Old points are gone; only the two fresh variants remain.
    assert_eq!(store.point_count(), 2);
    let fetched = pipeline.get_product("p1").await.unwrap();
    assert_eq!(fetched.name, "dark jeans");
}

#[tokio::test]
async fn test_regenerate_variants_replaces_points() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["blue jeans classic", "jeans for everyday"]"#);

    let store = MockVectorStore::new();
    seed(&store, &product("p1", "blue jeans", "蓝色"), &["old"]).await;

    let pipeline = pipeline(chat, store.clone());
    let count = pipeline.regenerate_variants("p1", Some(2)).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(store.point_count(), 2);
}

#[tokio::test]
async fn test_regenerate_with_unusable_output_is_no_variants() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["completely unrelated text"]"#);

    let store = MockVectorStore::new();
    seed(&store, &product("p1", "blue jeans", "蓝色"), &["old"]).await;

    let pipeline = pipeline(chat, store);
    let result = pipeline.regenerate_variants("p1", Some(2)).await;
    assert!(matches!(
        result,
        Err(PipelineError::Variant(VariantError::NoVariants))
    ));
}

#[tokio::test]
async fn test_list_products_deduplicates_variant_points() {
    let store = MockVectorStore::new();
    seed(
        &store,
        &product("p1", "blue jeans", "蓝色"),
        &["one", "two", "three"],
    )
    .await;
    seed(&store, &product("p2", "red shirt", "红色"), &["one"]).await;

    let pipeline = pipeline(MockChatBackend::new(), store);
    let products = pipeline.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn test_suggestions_fall_back_on_unusable_reply() {
    let chat = MockChatBackend::new();
    chat.push_text("not json at all");

    let pipeline = pipeline(chat, MockVectorStore::new());
    let suggestions = pipeline.suggestions("牛仔裤", None).await.unwrap();

    assert_eq!(suggestions.len(), 5);
    assert!(suggestions.iter().all(|s| s.starts_with("牛仔裤")));
}

#[tokio::test]
async fn test_suggestions_fall_back_when_chat_is_down() {
    let chat = MockChatBackend::new();
    chat.push_error(503, "chat endpoint unreachable");

    let pipeline = pipeline(chat, MockVectorStore::new());
    let suggestions = pipeline.suggestions("牛仔裤", None).await.unwrap();

    assert_eq!(suggestions.len(), 5);
    assert!(suggestions.iter().all(|s| s.starts_with("牛仔裤")));
}

#[tokio::test]
async fn test_suggestions_limit_defaults_and_caps() {
    let many: Vec<String> = (0..30).map(|i| format!("jeans {i}")).collect();

    let chat = MockChatBackend::new();
    chat.push_text(&serde_json::to_string(&many).unwrap());
    chat.push_text(&serde_json::to_string(&many).unwrap());
    chat.push_text(&serde_json::to_string(&many).unwrap());

    let pipeline = pipeline(chat, MockVectorStore::new());

    let capped = pipeline.suggestions("jeans", Some(100)).await.unwrap();
    assert_eq!(capped.len(), 20);

    let defaulted = pipeline.suggestions("jeans", Some(0)).await.unwrap();
    assert_eq!(defaulted.len(), 5);

    let two = pipeline.suggestions("jeans", Some(2)).await.unwrap();
    assert_eq!(two, vec!["jeans 0", "jeans 1"]);
}
