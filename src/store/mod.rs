//! Vector store integration (Qdrant).

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;
pub mod qdrant;

#[cfg(test)]
mod tests;

pub use error::StoreError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;
pub use model::{StoredHit, build_payload, product_from_payload};
pub use qdrant::QdrantStore;

use qdrant_client::qdrant::Filter;

use crate::product::{Product, ProductVariant};

/// Default collection holding product variant points.
pub const DEFAULT_COLLECTION_NAME: &str = "product_variants";

/// Default embedding dimensionality (OpenAI text-embedding models).
pub const DEFAULT_VECTOR_SIZE: u64 = 1536;

/// Store operations the pipeline depends on.
///
/// Implementations lazily establish their connection and schema on
/// first use; `ensure_ready` must be safe to call concurrently.
pub trait VectorStore: Send + Sync {
    /// Establishes the connection and collection if not yet done.
    fn ensure_ready(&self)
    -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Inserts one point per variant, payload denormalized from `product`.
    fn upsert_variants(
        &self,
        product: &Product,
        variants: &[ProductVariant],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Similarity query with a structured filter, capped at `limit`.
    /// Zero matches is an empty vec, not an error.
    fn query(
        &self,
        vector: Vec<f32>,
        filter: Filter,
        limit: u64,
    ) -> impl std::future::Future<Output = Result<Vec<StoredHit>, StoreError>> + Send;

    /// Reads one product back from any of its variant points.
    fn fetch_product(
        &self,
        product_id: &str,
    ) -> impl std::future::Future<Output = Result<Product, StoreError>> + Send;

    /// Deletes every point belonging to `product_id`.
    fn delete_product(
        &self,
        product_id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Scrolls product payloads matching `filter`, up to `limit` points.
    fn scroll_products(
        &self,
        filter: Filter,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, StoreError>> + Send;
}
