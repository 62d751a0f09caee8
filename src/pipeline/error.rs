use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::store::StoreError;
use crate::variants::VariantError;

#[derive(Debug, Error)]
/// Errors surfaced by pipeline operations. Intent parsing never shows
/// up here: search degrades around parse failures and suggestions
/// degrade to the default list.
pub enum PipelineError {
    /// Embedding the query or variant texts failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// A vector store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Variant generation failed.
    #[error(transparent)]
    Variant(#[from] VariantError),

    /// The caller sent something the pipeline cannot work with.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the input.
        reason: String,
    },
}
