//! Shopsearch library crate (used by the server binary and integration tests).
//!
//! Hybrid product search: an LLM extracts structured intent from free-text
//! queries, product descriptions are expanded into generated "variants",
//! and both sides meet in a vector similarity search over Qdrant.
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//! - [`SearchPipeline`], [`PipelineOptions`] - End-to-end orchestration
//! - [`IntentParser`], [`ParsedIntent`], [`EnhancedIntent`] - Query interpretation
//! - [`VariantGenerator`] - Product description variant generation
//! - [`OpenAiChatClient`], [`OpenAiEmbedder`], [`CachedEmbedder`] - LLM plumbing
//! - [`QdrantStore`], [`VectorStore`] - Vector store integration
//! - [`Product`], [`ProductDraft`], [`ProductVariant`] - Domain model
//! - [`create_router`] - Axum HTTP gateway
//!
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod embedding;
pub mod gateway;
pub mod intent;
pub mod llm;
pub mod pipeline;
pub mod product;
pub mod search;
pub mod store;
pub mod variants;

pub use config::{Config, ConfigError};
pub use embedding::{CachedEmbedder, Embedder, EmbeddingCache, EmbeddingError, OpenAiEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use gateway::{GatewayError, create_router};
pub use intent::{
    DEFAULT_SUGGESTION_COUNT, EnhancedIntent, IntentError, IntentParser, MAX_SUGGESTION_COUNT,
    ParsedIntent, default_suggestions,
};
pub use llm::{ChatBackend, ChatMessage, ChatRequest, ChatResponse, LlmError, OpenAiChatClient};
#[cfg(any(test, feature = "mock"))]
pub use llm::MockChatBackend;
pub use pipeline::{
    PipelineError, PipelineOptions, SearchOutcome, SearchPipeline, DEFAULT_MAX_RESULTS,
};
pub use product::{
    BatchImportFailure, BatchImportReport, Product, ProductDraft, ProductPatch, ProductStatus,
    ProductVariant,
};
pub use search::{MatchThresholds, SearchResult, intent_filter, match_reason};
pub use store::{
    DEFAULT_COLLECTION_NAME, DEFAULT_VECTOR_SIZE, QdrantStore, StoreError, StoredHit, VectorStore,
};
#[cfg(any(test, feature = "mock"))]
pub use store::MockVectorStore;
pub use variants::{VariantError, VariantGenerator};
