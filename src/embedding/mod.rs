//! Text embedding client and process-wide embedding cache.
//!
//! The [`Embedder`] trait is the seam between the pipeline and the
//! embedding API; [`CachedEmbedder`] wraps any implementation with an
//! exact-text memoization layer so repeated queries and variant texts
//! never hit the network twice.

pub mod cache;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use cache::{CachedEmbedder, EmbeddingCache};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::ApiErrorBody;

/// Default number of texts sent per embedding request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default pause between consecutive batches, to respect upstream rate limits.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Anything that can turn texts into fixed-dimension vectors.
pub trait Embedder: Send + Sync {
    /// Embeds `texts`, returning one vector per input in input order.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Clone)]
/// Embedding client for an OpenAI-compatible `/embeddings` endpoint.
///
/// Splits large inputs into batches of `batch_size` with a fixed
/// inter-batch delay. Calls are not retried; a failed batch fails the
/// whole request.
pub struct OpenAiEmbedder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    batch_size: usize,
    batch_delay: Duration,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        })
    }

    pub fn with_batching(mut self, batch_size: usize, batch_delay: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_delay = batch_delay;
        self
    }

    async fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        debug!(texts = texts.len(), "Sending embedding request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EmbeddingError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(EmbeddingError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse =
            serde_json::from_str(&body).map_err(|e| EmbeddingError::Decode {
                message: e.to_string(),
            })?;

        if let Some(err) = parsed.error {
            return Err(EmbeddingError::Api {
                message: err.message,
            });
        }

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                sent: texts.len(),
                got: parsed.data.len(),
            });
        }

        // The API reports an index per vector; place by index rather than
        // trusting response order.
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for data in parsed.data {
            if data.index >= vectors.len() {
                return Err(EmbeddingError::Decode {
                    message: format!("embedding index {} out of range", data.index),
                });
            }
            vectors[data.index] = Some(data.embedding);
        }

        vectors
            .into_iter()
            .map(|v| {
                v.ok_or(EmbeddingError::CountMismatch {
                    sent: texts.len(),
                    got: 0,
                })
            })
            .collect()
    }
}

impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let mut all = Vec::with_capacity(texts.len());
        let mut first = true;

        for chunk in texts.chunks(self.batch_size) {
            if !first {
                tokio::time::sleep(self.batch_delay).await;
            }
            first = false;

            let vectors = self.embed_single_batch(chunk).await?;
            all.extend(vectors);
        }

        Ok(all)
    }
}
