//! HTTP gateway (Axum) for search and product management.
//!
//! Handlers are generic over the pipeline's chat, embedding and store
//! implementations, so the same router serves production clients and
//! in-memory test doubles.

pub mod error;
pub mod handler;
pub mod payload;


use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;

use crate::embedding::Embedder;
use crate::llm::ChatBackend;
use crate::pipeline::SearchPipeline;
use crate::store::VectorStore;

use handler::{
    batch_import_handler, create_product_handler, delete_product_handler, get_product_handler,
    list_products_handler, regenerate_variants_handler, search_handler, suggestions_handler,
    update_product_handler,
};

pub fn create_router<C, E, S>(pipeline: Arc<SearchPipeline<C, E, S>>) -> Router
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/search", post(search_handler))
        .route("/api/v1/search/suggestions", get(suggestions_handler))
        .route(
            "/api/v1/products",
            post(create_product_handler).get(list_products_handler),
        )
        .route(
            "/api/v1/products/{id}",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .route("/api/v1/products/batch", post(batch_import_handler))
        .route(
            "/api/v1/products/{id}/variants/regenerate",
            post(regenerate_variants_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
