use crate::embedding::EmbeddingError;
use crate::llm::LlmError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by variant generation.
pub enum VariantError {
    /// The chat call itself failed.
    #[error("variant generation call failed: {0}")]
    Chat(#[from] LlmError),

    /// The model answered with no usable text at all.
    #[error("chat response carried no content")]
    EmptyResponse,

    /// Generation and filtering left zero usable variants.
    #[error("no valid variants were generated")]
    NoVariants,

    /// Embedding the variant texts failed.
    #[error("failed to embed variants: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A store operation inside regeneration failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
