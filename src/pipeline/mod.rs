//! End-to-end orchestration of search and product lifecycle operations.
//!
//! The pipeline owns one of everything: an intent parser, a variant
//! generator, a cached embedder and a vector store. Handlers call it,
//! it never calls back out.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::PipelineError;

use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::embedding::{CachedEmbedder, Embedder};
use crate::intent::{
    DEFAULT_SUGGESTION_COUNT, IntentParser, MAX_SUGGESTION_COUNT, ParsedIntent,
};
use crate::llm::ChatBackend;
use crate::product::{
    BatchImportFailure, BatchImportReport, Product, ProductDraft, ProductPatch,
};
use crate::search::{MatchThresholds, SearchResult, intent_filter, run_search};
use crate::store::VectorStore;
use crate::variants::VariantGenerator;

/// Result cap when the caller does not pass a limit, and the hard upper
/// bound on what a caller may request.
pub const DEFAULT_MAX_RESULTS: u64 = 20;

/// Variants generated for a single product create or regenerate.
pub const DEFAULT_VARIANT_COUNT: i32 = 5;

/// Variants generated per product during batch import. Lower than the
/// single-product count to keep large imports within rate limits.
pub const BATCH_VARIANT_COUNT: i32 = 3;

/// Page size for product listing scrolls.
pub const DEFAULT_LIST_LIMIT: u32 = 200;

/// Tunables the pipeline reads per request.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_results: u64,
    pub thresholds: MatchThresholds,
    pub variant_count: i32,
    pub batch_variant_count: i32,
    pub list_limit: u32,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            thresholds: MatchThresholds::default(),
            variant_count: DEFAULT_VARIANT_COUNT,
            batch_variant_count: BATCH_VARIANT_COUNT,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Everything a search call produces, ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub intent: ParsedIntent,
    pub results: Vec<SearchResult>,
    pub total: usize,
    pub took_ms: u64,
}

/// The service core. One instance is shared across all requests.
pub struct SearchPipeline<C, E, S> {
    parser: IntentParser<C>,
    generator: VariantGenerator<C>,
    embedder: CachedEmbedder<E>,
    store: S,
    options: PipelineOptions,
}

impl<C, E, S> SearchPipeline<C, E, S>
where
    C: ChatBackend,
    E: Embedder,
    S: VectorStore,
{
    pub fn new(
        parser: IntentParser<C>,
        generator: VariantGenerator<C>,
        embedder: CachedEmbedder<E>,
        store: S,
        options: PipelineOptions,
    ) -> Self {
        Self {
            parser,
            generator,
            embedder,
            store,
            options,
        }
    }

    /// Runs one hybrid search: parse, enhance, embed, filter, retrieve.
    ///
    /// Interpretation problems degrade rather than fail. A parse failure
    /// falls back to treating the raw query as the product type, and a
    /// validation failure is logged and ignored, so this only errors when
    /// embedding or retrieval itself does.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: Option<u64>,
    ) -> Result<SearchOutcome, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidRequest {
                reason: "query must not be empty".to_string(),
            });
        }

        let started = Instant::now();

        let intent = match self.parser.parse(query).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, query, "Intent parsing failed, using raw query");
                ParsedIntent::from_raw_query(query)
            }
        };

        if let Err(e) = intent.validate() {
            warn!(error = %e, "Intent failed validation, searching anyway");
        }

        let enhanced = intent.enhance();

        let mut search_text = enhanced.search_query();
        if search_text.is_empty() {
            search_text = query;
        }

        let vector = self.embedder.embed_one(search_text).await?;

        self.store.ensure_ready().await?;

        let limit = limit
            .unwrap_or(self.options.max_results)
            .clamp(1, self.options.max_results);

        let results = run_search(
            &self.store,
            vector,
            intent_filter(enhanced.intent()),
            limit,
            enhanced.intent(),
            &self.options.thresholds,
        )
        .await?;

        let outcome = SearchOutcome {
            query: query.to_string(),
            intent: enhanced.intent().clone(),
            total: results.len(),
            results,
            took_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            query,
            results = outcome.total,
            took_ms = outcome.took_ms,
            "Search completed"
        );
        Ok(outcome)
    }

    /// Query completion suggestions for a partial query. A missing or
    /// zero `limit` means 5; requests above 20 are capped.
    pub async fn suggestions(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidRequest {
                reason: "query must not be empty".to_string(),
            });
        }

        let limit = match limit {
            Some(n) if n >= 1 => n.min(MAX_SUGGESTION_COUNT),
            _ => DEFAULT_SUGGESTION_COUNT,
        };

        Ok(self.parser.suggestions(query, limit).await)
    }

    /// Creates a product and indexes its generated variants.
    #[instrument(skip(self, draft), fields(product = %draft.name))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, PipelineError> {
        validate_draft(&draft)?;

        let product = draft.into_product();

        let variants = self
            .generator
            .generate_with_embeddings(&product, self.options.variant_count, &self.embedder)
            .await?;

        self.store.ensure_ready().await?;
        self.store.upsert_variants(&product, &variants).await?;

        info!(product_id = %product.id, variants = variants.len(), "Product created");
        Ok(product)
    }

    /// Reads one product back from its indexed variants.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, PipelineError> {
        self.store.ensure_ready().await?;
        Ok(self.store.fetch_product(product_id).await?)
    }

    /// Lists indexed products. Each product appears once even though it
    /// is stored as several variant points.
    pub async fn list_products(&self) -> Result<Vec<Product>, PipelineError> {
        self.store.ensure_ready().await?;

        let products = self
            .store
            .scroll_products(Default::default(), self.options.list_limit)
            .await?;

        let mut seen = std::collections::HashSet::new();
        Ok(products
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect())
    }

    /// Applies a partial update and reindexes the product's variants
    /// from the updated fields.
    pub async fn update_product(
        &self,
        product_id: &str,
        patch: ProductPatch,
    ) -> Result<Product, PipelineError> {
        self.store.ensure_ready().await?;

        let mut product = self.store.fetch_product(product_id).await?;
        product.apply_patch(patch);

        let variants = self
            .generator
            .generate_with_embeddings(&product, self.options.variant_count, &self.embedder)
            .await?;

        self.store.delete_product(product_id).await?;
        self.store.upsert_variants(&product, &variants).await?;

        info!(product_id, "Product updated and reindexed");
        Ok(product)
    }

    /// Removes a product and all of its variant points. Unknown ids are
    /// an error rather than a silent no-op.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), PipelineError> {
        self.store.ensure_ready().await?;

        self.store.fetch_product(product_id).await?;
        self.store.delete_product(product_id).await?;

        info!(product_id, "Product deleted");
        Ok(())
    }

    /// Regenerates a product's variants in place.
    pub async fn regenerate_variants(
        &self,
        product_id: &str,
        count: Option<i32>,
    ) -> Result<usize, PipelineError> {
        self.store.ensure_ready().await?;

        let count = count.unwrap_or(self.options.variant_count);
        Ok(self
            .generator
            .regenerate(product_id, count, &self.store, &self.embedder)
            .await?)
    }

    /// Imports products in bulk. One item failing never aborts the
    /// batch; each failure is recorded in the report with its index.
    #[instrument(skip(self, drafts), fields(items = drafts.len()))]
    pub async fn batch_import(&self, drafts: Vec<ProductDraft>) -> Result<BatchImportReport, PipelineError> {
        if drafts.is_empty() {
            return Err(PipelineError::InvalidRequest {
                reason: "batch must contain at least one product".to_string(),
            });
        }

        self.store.ensure_ready().await?;

        let process_id = Uuid::new_v4().to_string();
        let total = drafts.len();
        let mut errors = Vec::new();

        for (index, draft) in drafts.into_iter().enumerate() {
            let name = draft.name.clone();
            if let Err(e) = self.import_one(draft).await {
                warn!(index, product = %name, error = %e, "Batch item failed");
                errors.push(BatchImportFailure {
                    index,
                    product: name,
                    error: e.to_string(),
                });
            }
        }

        let failed = errors.len();
        let report = BatchImportReport {
            total,
            success: total - failed,
            failed,
            errors,
            process_id,
        };

        info!(
            process_id = %report.process_id,
            total = report.total,
            success = report.success,
            failed = report.failed,
            "Batch import finished"
        );
        Ok(report)
    }

    async fn import_one(&self, draft: ProductDraft) -> Result<(), PipelineError> {
        validate_draft(&draft)?;

        let product = draft.into_product();
        let variants = self
            .generator
            .generate_with_embeddings(&product, self.options.batch_variant_count, &self.embedder)
            .await?;

        self.store.upsert_variants(&product, &variants).await?;
        Ok(())
    }

    /// The embedder shared by all operations, mainly for cache inspection.
    pub fn embedder(&self) -> &CachedEmbedder<E> {
        &self.embedder
    }
}

fn validate_draft(draft: &ProductDraft) -> Result<(), PipelineError> {
    if draft.name.trim().is_empty() {
        return Err(PipelineError::InvalidRequest {
            reason: "product name must not be empty".to_string(),
        });
    }
    if draft.price < 0.0 {
        return Err(PipelineError::InvalidRequest {
            reason: "product price cannot be negative".to_string(),
        });
    }
    Ok(())
}
