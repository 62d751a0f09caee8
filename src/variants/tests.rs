use chrono::Utc;

use super::*;
use crate::embedding::MockEmbedder;
use crate::llm::MockChatBackend;
use crate::product::ProductStatus;

fn test_product(name: &str, category: &str) -> Product {
    let now = Utc::now();
    Product {
        id: "p1".to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: "comfortable everyday wear".to_string(),
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
        status: ProductStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_clamp_count() {
    assert_eq!(clamp_count(0), 5);
    assert_eq!(clamp_count(-3), 5);
    assert_eq!(clamp_count(7), 7);
    assert_eq!(clamp_count(50), 20);
}

#[tokio::test]
async fn test_generate_parses_json_array() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic blue jeans", "slim fit jeans for work"]"#);

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 2)
        .await
        .unwrap();

    assert_eq!(variants, vec!["classic blue jeans", "slim fit jeans for work"]);
}

#[tokio::test]
async fn test_generate_extracts_bracketed_json_from_prose() {
    let chat = MockChatBackend::new();
    chat.push_text(
        "Sure! Here are the descriptions:\n[\"faded blue jeans\", \"stretch denim jeans\"]\nEnjoy!",
    );

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 2)
        .await
        .unwrap();

    assert_eq!(variants.len(), 2);
    assert_eq!(variants[0], "faded blue jeans");
}

#[tokio::test]
async fn test_generate_falls_back_to_line_extraction() {
    let chat = MockChatBackend::new();
    chat.push_text(
        "```\n# suggestions\n- \"relaxed fit jeans\"\n* jeans with a vintage wash\n1. tapered jeans for fall\n\n// trailing comment\n```",
    );

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 3)
        .await
        .unwrap();

    assert_eq!(
        variants,
        vec![
            "relaxed fit jeans",
            "jeans with a vintage wash",
            "tapered jeans for fall",
        ]
    );
}

#[tokio::test]
async fn test_post_filter_drops_bad_lengths_keeps_keyword_match() {
    let long = "jeans ".repeat(30);
    let chat = MockChatBackend::new();
    chat.push_text(serde_json::json!(["gym", long, "a 30-char phrase about jeans"]).to_string());

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 3)
        .await
        .unwrap();

    assert_eq!(variants, vec!["a 30-char phrase about jeans"]);
}

#[tokio::test]
async fn test_post_filter_requires_product_reference() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["a lovely red scarf for winter", "classic blue jeans"]"#);

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 2)
        .await
        .unwrap();

    assert_eq!(variants, vec!["classic blue jeans"]);
}

#[tokio::test]
async fn test_post_filter_deduplicates_preserving_order() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic blue jeans", "stretch jeans", "classic blue jeans"]"#);

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let variants = generator
        .generate(&test_product("Blue Jeans", "jeans"), 3)
        .await
        .unwrap();

    assert_eq!(variants, vec!["classic blue jeans", "stretch jeans"]);
}

#[tokio::test]
async fn test_generate_with_embeddings_requires_variants() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["completely unrelated description"]"#);

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let embedder = MockEmbedder::new(4);
    let result = generator
        .generate_with_embeddings(&test_product("Blue Jeans", "jeans"), 2, &embedder)
        .await;

    assert!(matches!(result, Err(VariantError::NoVariants)));
    assert_eq!(embedder.call_count(), 0, "nothing should be embedded");
}

#[tokio::test]
async fn test_generate_with_embeddings_attaches_product_id_and_vectors() {
    let chat = MockChatBackend::new();
    chat.push_text(r#"["classic blue jeans", "stretch jeans for travel"]"#);

    let generator = VariantGenerator::new(chat, "test-model", 1500);
    let embedder = MockEmbedder::new(4);
    let variants = generator
        .generate_with_embeddings(&test_product("Blue Jeans", "jeans"), 2, &embedder)
        .await
        .unwrap();

    assert_eq!(variants.len(), 2);
    for variant in &variants {
        assert_eq!(variant.product_id, "p1");
        assert_eq!(variant.vector, embedder.vector_for(&variant.text));
    }
}

#[test]
fn test_prompt_substitutes_unspecified_for_empty_fields() {
    let chat = MockChatBackend::new();
    let generator = VariantGenerator::new(chat, "test-model", 1500);

    let prompt = generator.build_prompt(&test_product("Blue Jeans", "jeans"), 4);
    assert!(prompt.contains("Name: Blue Jeans"));
    assert!(prompt.contains("Brand: unspecified"));
    assert!(prompt.contains("Size: unspecified"));
    assert!(prompt.contains("Generate 4 different"));
    assert!(!prompt.contains("{product_name}"));
    assert!(!prompt.contains("Brand: \n"));
}
