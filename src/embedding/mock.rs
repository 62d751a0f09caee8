//! Deterministic in-process embedder for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::EmbeddingError;
use super::Embedder;

/// Embedder that derives a stable pseudo-vector from the text bytes.
/// The same text always yields the same vector, which is exactly the
/// property the cache layer relies on.
#[derive(Clone)]
pub struct MockEmbedder {
    dim: usize,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl MockEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of upstream calls observed (one per batch).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this embedder produces for `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        // FNV-style fold into a seed, then a small LCG per component.
        let mut seed: u64 = 0xcbf29ce484222325;
        for byte in text.bytes() {
            seed ^= u64::from(byte);
            seed = seed.wrapping_mul(0x100000001b3);
        }

        let mut state = seed | 1;
        let mut vector = Vec::with_capacity(self.dim);
        for _ in 0..self.dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            vector.push(((state >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0);
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Embedder for MockEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}
