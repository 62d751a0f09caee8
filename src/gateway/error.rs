use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm::LlmError;
use crate::pipeline::PipelineError;
use crate::store::StoreError;
use crate::variants::VariantError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("product not found: {0}")]
    NotFound(String),

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("no valid variants could be generated")]
    NoVariants,

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<PipelineError> for GatewayError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest { reason } => GatewayError::InvalidRequest(reason),
            PipelineError::Store(StoreError::ProductNotFound { product_id }) => {
                GatewayError::NotFound(product_id)
            }
            PipelineError::Store(e) => GatewayError::Internal(e.to_string()),
            PipelineError::Embedding(e) => match e {
                EmbeddingError::Upstream { .. }
                | EmbeddingError::Request { .. }
                | EmbeddingError::Api { .. } => GatewayError::Upstream(e.to_string()),
                other => GatewayError::Internal(other.to_string()),
            },
            PipelineError::Variant(e) => match e {
                VariantError::NoVariants => GatewayError::NoVariants,
                VariantError::Chat(inner @ LlmError::Upstream { .. })
                | VariantError::Chat(inner @ LlmError::Request { .. })
                | VariantError::Chat(inner @ LlmError::Api { .. }) => {
                    GatewayError::Upstream(inner.to_string())
                }
                VariantError::Store(StoreError::ProductNotFound { product_id }) => {
                    GatewayError::NotFound(product_id)
                }
                other => GatewayError::Internal(other.to_string()),
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NoVariants => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
