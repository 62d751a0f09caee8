//! Exact-text embedding cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::error::EmbeddingError;
use super::Embedder;

/// Text → vector cache keyed by the exact input text (case- and
/// whitespace-sensitive). No TTL and no eviction: the same text always
/// embeds to the same vector, so the map only ever grows and an existing
/// entry is never replaced.
#[derive(Default)]
pub struct EmbeddingCache {
    entries: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.entries.lock().get(text).cloned()
    }

    /// Idempotent insert: a vector already cached for `text` wins over
    /// any later value.
    pub fn insert(&self, text: String, vector: Vec<f32>) {
        self.entries.lock().entry(text).or_insert(vector);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Embedder wrapper that consults an [`EmbeddingCache`] before the
/// network. Cached texts short-circuit entirely; only the uncached
/// subset is sent upstream, in one batched call, and results are
/// stitched back into input order.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Arc<EmbeddingCache>,
}

impl<E: Embedder> CachedEmbedder<E> {
    /// Wraps `inner` with an explicitly owned, injected cache.
    pub fn new(inner: E, cache: Arc<EmbeddingCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Embeds one text.
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            sent: 1,
            got: 0,
        })
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text) {
                Some(vector) => results[i] = Some(vector),
                None => {
                    uncached_texts.push(text.clone());
                    uncached_indices.push(i);
                }
            }
        }

        let fetched = uncached_texts.len();

        if !uncached_texts.is_empty() {
            let fresh = self.inner.embed_batch(&uncached_texts).await?;

            if fresh.len() != uncached_texts.len() {
                return Err(EmbeddingError::CountMismatch {
                    sent: uncached_texts.len(),
                    got: fresh.len(),
                });
            }

            for ((index, text), vector) in uncached_indices
                .into_iter()
                .zip(uncached_texts)
                .zip(fresh)
            {
                self.cache.insert(text, vector.clone());
                results[index] = Some(vector);
            }
        }

        debug!(
            total = texts.len(),
            fetched,
            from_cache = texts.len() - fetched,
            "Embedding batch resolved"
        );

        // Every slot is filled: cached up front, fresh in the loop above.
        Ok(results.into_iter().flatten().collect())
    }
}
