use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by vector store operations.
pub enum StoreError {
    /// Could not connect to the Qdrant endpoint.
    #[error("failed to connect to Qdrant at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Collection creation failed.
    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Upsert failed.
    #[error("failed to upsert points to '{collection}': {message}")]
    UpsertFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Similarity query failed.
    #[error("failed to search in '{collection}': {message}")]
    SearchFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Delete failed.
    #[error("failed to delete points from '{collection}': {message}")]
    DeleteFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Scroll/pagination failed.
    #[error("failed to scroll '{collection}': {message}")]
    ScrollFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// No point carries the requested product id.
    #[error("product not found: {product_id}")]
    ProductNotFound {
        /// Product id.
        product_id: String,
    },
}
