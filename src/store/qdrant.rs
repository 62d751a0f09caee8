//! Qdrant-backed [`VectorStore`] with a lazy two-state lifecycle.

use std::time::Duration;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::product::{Product, ProductVariant};

use super::error::StoreError;
use super::model::{StoredHit, build_payload, product_from_payload};
use super::VectorStore;

/// Qdrant client wrapper. The connection and collection are established
/// on first use; the guard makes concurrent first requests safe, and a
/// collection that already exists (including one created by a racing
/// request) is treated as success.
pub struct QdrantStore {
    url: String,
    api_key: Option<String>,
    collection: String,
    vector_size: u64,
    timeout: Duration,
    client: OnceCell<Qdrant>,
}

impl QdrantStore {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        collection: impl Into<String>,
        vector_size: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            api_key,
            collection: collection.into(),
            vector_size,
            timeout,
            client: OnceCell::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn client(&self) -> Result<&Qdrant, StoreError> {
        self.client
            .get_or_try_init(|| async {
                let mut builder = Qdrant::from_url(&self.url).timeout(self.timeout);
                if let Some(key) = &self.api_key {
                    builder = builder.api_key(key.clone());
                }

                let client = builder.build().map_err(|e| StoreError::ConnectionFailed {
                    url: self.url.clone(),
                    message: e.to_string(),
                })?;

                self.ensure_collection(&client).await?;

                info!(collection = %self.collection, "Qdrant store initialized");
                Ok(client)
            })
            .await
    }

    async fn ensure_collection(&self, client: &Qdrant) -> Result<(), StoreError> {
        let exists = client.collection_exists(&self.collection).await.map_err(|e| {
            StoreError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            }
        })?;

        if exists {
            debug!(collection = %self.collection, "Collection already exists");
            return Ok(());
        }

        let vectors_config = VectorParamsBuilder::new(self.vector_size, Distance::Cosine);
        let created = client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(vectors_config),
            )
            .await;

        if let Err(e) = created {
            // A concurrent first request may have won the creation race.
            let exists_now = client
                .collection_exists(&self.collection)
                .await
                .unwrap_or(false);
            if !exists_now {
                return Err(StoreError::CreateCollectionFailed {
                    collection: self.collection.clone(),
                    message: e.to_string(),
                });
            }
        } else {
            info!(collection = %self.collection, size = self.vector_size, "Collection created");
        }

        Ok(())
    }

    fn product_filter(product_id: &str) -> Filter {
        Filter::must([Condition::matches("product_id", product_id.to_string())])
    }
}

impl VectorStore for QdrantStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        self.client().await.map(|_| ())
    }

    async fn upsert_variants(
        &self,
        product: &Product,
        variants: &[ProductVariant],
    ) -> Result<(), StoreError> {
        if variants.is_empty() {
            return Ok(());
        }

        let client = self.client().await?;

        let points: Vec<PointStruct> = variants
            .iter()
            .map(|variant| {
                PointStruct::new(
                    variant.id.clone(),
                    variant.vector.clone(),
                    build_payload(product, variant),
                )
            })
            .collect();

        client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(|e| StoreError::UpsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        debug!(
            product_id = %product.id,
            variants = variants.len(),
            "Upserted variant points"
        );
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        filter: Filter,
        limit: u64,
    ) -> Result<Vec<StoredHit>, StoreError> {
        let client = self.client().await?;

        let request = SearchPointsBuilder::new(&self.collection, vector, limit)
            .filter(filter)
            .with_payload(true);

        let response = client
            .search_points(request)
            .await
            .map_err(|e| StoreError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .into_iter()
            .map(|point| StoredHit::from_payload(point.score, &point.payload))
            .collect())
    }

    async fn fetch_product(&self, product_id: &str) -> Result<Product, StoreError> {
        let client = self.client().await?;

        // Any one of the product's variant points carries the full
        // denormalized payload; scroll one out by filter.
        let request = ScrollPointsBuilder::new(&self.collection)
            .filter(Self::product_filter(product_id))
            .limit(1)
            .with_payload(true);

        let response = client
            .scroll(request)
            .await
            .map_err(|e| StoreError::ScrollFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let point = response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: product_id.to_string(),
            })?;

        Ok(product_from_payload(&point.payload))
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), StoreError> {
        let client = self.client().await?;

        client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Self::product_filter(product_id))
                    .wait(true),
            )
            .await
            .map_err(|e| StoreError::DeleteFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        debug!(product_id, "Deleted product points");
        Ok(())
    }

    async fn scroll_products(&self, filter: Filter, limit: u32) -> Result<Vec<Product>, StoreError> {
        let client = self.client().await?;

        let request = ScrollPointsBuilder::new(&self.collection)
            .filter(filter)
            .limit(limit)
            .with_payload(true);

        let response = client
            .scroll(request)
            .await
            .map_err(|e| StoreError::ScrollFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(response
            .result
            .iter()
            .map(|point| product_from_payload(&point.payload))
            .collect())
    }
}
