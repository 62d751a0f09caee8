//! End-to-end tests over the full pipeline with in-memory backends.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use shopsearch::embedding::{CachedEmbedder, EmbeddingCache, MockEmbedder};
use shopsearch::intent::IntentParser;
use shopsearch::llm::MockChatBackend;
use shopsearch::pipeline::{PipelineOptions, SearchPipeline};
use shopsearch::product::{Product, ProductDraft, ProductStatus, ProductVariant};
use shopsearch::store::{MockVectorStore, VectorStore};
use shopsearch::variants::VariantGenerator;

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

fn product(id: &str, name: &str, color: &str, price: f64) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "牛仔裤".to_string(),
        description: String::new(),
        price,
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

fn draft(name: &str, category: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: category.to_string(),
        description: String::new(),
        price: 25.0,
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
    }
}

// When the intent endpoint is unreachable the raw query becomes the
// product type and search still returns ranked results.
#[tokio::test]
async fn search_returns_results_when_intent_parsing_fails() {
    let chat = MockChatBackend::new();
    chat.push_error(503, "intent endpoint unreachable");

    let store = MockVectorStore::new();
    seed(
        &store,
        &product("p1", "蓝色牛仔裤", "蓝色", 199.0),
        &["蓝色牛仔裤", "舒适的蓝色牛仔裤"],
    )
    .await;

    let pipeline = pipeline(chat, store);
    let outcome = pipeline.search("蓝色牛仔裤", None).await.unwrap();

    assert!(outcome.total >= 1, "fallback search must still find hits");
    assert_eq!(outcome.intent.product_type.as_deref(), Some("蓝色牛仔裤"));
    assert_eq!(outcome.results[0].product.id, "p1");
    assert_eq!(outcome.results[0].match_reason, "high semantic match");
}

// A fully parsed intent narrows results by normalized attributes and a
// price range, and the match reason names each active dimension.
#[tokio::test]
async fn search_applies_parsed_filters() {
    let chat = MockChatBackend::new();
    chat.push_function_call(
        "extract_product_intent",
        r#"{"product_type": "牛仔服", "color": "红", "price_max": 300.0}"#,
    );

    let store = MockVectorStore::new();
    seed(&store, &product("cheap-red", "红色牛仔裤", "红色", 199.0), &["牛仔裤"]).await;
    seed(&store, &product("pricey-red", "高端红色牛仔裤", "红色", 899.0), &["牛仔裤"]).await;
    seed(&store, &product("cheap-blue", "蓝色牛仔裤", "蓝色", 199.0), &["牛仔裤"]).await;

    let pipeline = pipeline(chat, store);
    let outcome = pipeline.search("300元以内的红色牛仔服", None).await.unwrap();

    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.results[0].product.id, "cheap-red");
    assert_eq!(
        outcome.results[0].match_reason,
        "high semantic match + color match, price range match"
    );
}

// Per-item isolation: a failing item is reported with its index while
// the rest of the batch imports normally.
#[tokio::test]
async fn batch_import_reports_partial_failure() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic red shirt", "red shirt for summer", "soft red shirt"]"#);
    chat.push_error(500, "generation endpoint down");
    chat.push_text(r#"["warm wool scarf", "wool scarf for winter", "long wool scarf"]"#);

    let store = MockVectorStore::new();
    let import_pipeline = pipeline(chat, store.clone());

    let report = import_pipeline
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
    assert_eq!(store.point_count(), 6);

    // Imported products are immediately searchable.
    let fallback_chat = MockChatBackend::new();
    fallback_chat.push_error(500, "down");
    let search_pipeline = pipeline(fallback_chat, store);
    let outcome = search_pipeline.search("red shirt", None).await.unwrap();
    assert!(outcome.results.iter().all(|r| r.product.name != "Green Hat"));
}

// Repeated searches for the same text are served from the embedding
// cache; the upstream embedder is only hit once.
#[tokio::test]
async fn repeated_queries_reuse_the_embedding_cache() {
    let chat = MockChatBackend::new();
    chat.push_error(500, "down");
    chat.push_error(500, "down");

    let store = MockVectorStore::new();
    seed(&store, &product("p1", "牛仔裤", "蓝色", 199.0), &["牛仔裤"]).await;

    let inner = MockEmbedder::new(DIM);
    let parser = IntentParser::new(chat.clone(), "chat-model", 1000);
    let generator = VariantGenerator::new(chat, "chat-model", 1500);
    let embedder = CachedEmbedder::new(inner.clone(), Arc::new(EmbeddingCache::new()));
    let pipeline =
        SearchPipeline::new(parser, generator, embedder, store, PipelineOptions::default());

    pipeline.search("牛仔裤", None).await.unwrap();
    pipeline.search("牛仔裤", None).await.unwrap();

    assert_eq!(inner.call_count(), 1);
    assert_eq!(pipeline.embedder().cache().len(), 1);
}

// Full lifecycle: create, update, regenerate, delete.
#[tokio::test]
async fn product_lifecycle_round_trip() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic blue jeans", "stretch jeans for travel"]"#);

    let store = MockVectorStore::new();
    let pipeline = pipeline(chat.clone(), store.clone());

    let created = pipeline.create_product(draft("Blue Jeans", "jeans")).await.unwrap();
    assert_eq!(store.point_count(), 2);

    chat.push_text(r#"["dark jeans for work", "jeans in a dark wash"]"#);
    let patch = shopsearch::product::ProductPatch {
        name: Some("Dark Jeans".to_string()),
        ..Default::default()
    };
    let updated = pipeline.update_product(&created.id, patch).await.unwrap();
    assert_eq!(updated.name, "Dark Jeans");
    assert_eq!(store.point_count(), 2);

    chat.push_text(r#"["jeans for the office", "everyday dark jeans", "slim dark jeans"]"#);
    let count = pipeline.regenerate_variants(&created.id, Some(3)).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(store.point_count(), 3);

    pipeline.delete_product(&created.id).await.unwrap();
    assert_eq!(store.point_count(), 0);
    assert!(pipeline.get_product(&created.id).await.is_err());
}
