use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::embedding::Embedder;
use crate::llm::ChatBackend;
use crate::pipeline::SearchPipeline;
use crate::product::{BatchImportReport, Product, ProductDraft, ProductPatch};
use crate::store::VectorStore;

use super::error::GatewayError;
use super::payload::{
    BatchImportRequest, DeleteResponse, RegenerateRequest, RegenerateResponse, SearchRequest,
    SuggestionsQuery, SuggestionsResponse,
};

type Pipeline<C, E, S> = Arc<SearchPipeline<C, E, S>>;

#[instrument(skip(pipeline, request), fields(query = %request.query))]
pub async fn search_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Json(request): Json<SearchRequest>,
) -> Result<Response, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let outcome = pipeline.search(&request.query, request.limit).await?;
    Ok((StatusCode::OK, Json(outcome)).into_response())
}

#[instrument(skip(pipeline, params), fields(query = %params.q))]
pub async fn suggestions_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Query(params): Query<SuggestionsQuery>,
) -> Result<Json<SuggestionsResponse>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let suggestions = pipeline.suggestions(&params.q, params.limit).await?;
    Ok(Json(SuggestionsResponse {
        query: params.q,
        suggestions,
    }))
}

#[instrument(skip(pipeline, draft), fields(product = %draft.name))]
pub async fn create_product_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Json(draft): Json<ProductDraft>,
) -> Result<Response, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let product = pipeline.create_product(draft).await?;
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

#[instrument(skip(pipeline))]
pub async fn get_product_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let product = pipeline.get_product(&id).await?;
    Ok(Json(product))
}

#[instrument(skip(pipeline))]
pub async fn list_products_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
) -> Result<Json<Vec<Product>>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let products = pipeline.list_products().await?;
    Ok(Json(products))
}

#[instrument(skip(pipeline, patch))]
pub async fn update_product_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let product = pipeline.update_product(&id, patch).await?;
    Ok(Json(product))
}

#[instrument(skip(pipeline))]
pub async fn delete_product_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    pipeline.delete_product(&id).await?;
    Ok(Json(DeleteResponse {
        product_id: id,
        deleted: true,
    }))
}

#[instrument(skip(pipeline, request))]
pub async fn batch_import_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Json(request): Json<BatchImportRequest>,
) -> Result<Json<BatchImportReport>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let report = pipeline.batch_import(request.products).await?;
    Ok(Json(report))
}

#[instrument(skip(pipeline, request))]
pub async fn regenerate_variants_handler<C, E, S>(
    State(pipeline): State<Pipeline<C, E, S>>,
    Path(id): Path<String>,
    request: Option<Json<RegenerateRequest>>,
) -> Result<Json<RegenerateResponse>, GatewayError>
where
    C: ChatBackend + 'static,
    E: Embedder + 'static,
    S: VectorStore + 'static,
{
    let count = request.and_then(|Json(r)| r.count);
    let variants = pipeline.regenerate_variants(&id, count).await?;
    Ok(Json(RegenerateResponse {
        product_id: id,
        variants,
    }))
}
