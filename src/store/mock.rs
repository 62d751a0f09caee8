//! In-memory [`VectorStore`] for tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use qdrant_client::qdrant::condition::ConditionOneOf;
use qdrant_client::qdrant::r#match::MatchValue;
use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Value};

use crate::product::{Product, ProductVariant};

use super::error::StoreError;
use super::model::{StoredHit, build_payload, product_from_payload, payload_str};
use super::VectorStore;

#[derive(Clone)]
struct MockPoint {
    vector: Vec<f32>,
    payload: HashMap<String, Value>,
}

/// Store backed by a plain vec of points, scoring with true cosine
/// similarity and evaluating `must` filter clauses against payloads.
#[derive(Clone, Default)]
pub struct MockVectorStore {
    points: Arc<Mutex<Vec<MockPoint>>>,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self) -> usize {
        self.points.lock().len()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn matches_field(payload: &HashMap<String, Value>, field: &FieldCondition) -> bool {
    let value = payload.get(&field.key);

    if let Some(m) = &field.r#match {
        let Some(value) = value else { return false };
        return match &m.match_value {
            Some(MatchValue::Keyword(s)) | Some(MatchValue::Text(s)) => {
                value.as_str().map(|v| *v == *s).unwrap_or(false)
            }
            Some(MatchValue::Integer(i)) => value.as_integer() == Some(*i),
            Some(MatchValue::Boolean(b)) => value.as_bool() == Some(*b),
            _ => false,
        };
    }

    if let Some(range) = &field.range {
        let Some(number) = value.and_then(|v| v.as_double().or(v.as_integer().map(|i| i as f64)))
        else {
            return false;
        };
        if range.gte.is_some_and(|gte| number < gte) {
            return false;
        }
        if range.lte.is_some_and(|lte| number > lte) {
            return false;
        }
        if range.gt.is_some_and(|gt| number <= gt) {
            return false;
        }
        if range.lt.is_some_and(|lt| number >= lt) {
            return false;
        }
        return true;
    }

    false
}

fn matches_condition(payload: &HashMap<String, Value>, condition: &Condition) -> bool {
    match &condition.condition_one_of {
        Some(ConditionOneOf::Field(field)) => matches_field(payload, field),
        // The pipeline only emits field conditions.
        _ => false,
    }
}

fn matches_filter(payload: &HashMap<String, Value>, filter: &Filter) -> bool {
    filter.must.iter().all(|c| matches_condition(payload, c))
        && !filter.must_not.iter().any(|c| matches_condition(payload, c))
}

impl VectorStore for MockVectorStore {
    async fn ensure_ready(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn upsert_variants(
        &self,
        product: &Product,
        variants: &[ProductVariant],
    ) -> Result<(), StoreError> {
        let mut points = self.points.lock();
        for variant in variants {
            points.push(MockPoint {
                vector: variant.vector.clone(),
                payload: build_payload(product, variant),
            });
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        filter: Filter,
        limit: u64,
    ) -> Result<Vec<StoredHit>, StoreError> {
        let points = self.points.lock();

        let mut hits: Vec<StoredHit> = points
            .iter()
            .filter(|p| matches_filter(&p.payload, &filter))
            .map(|p| StoredHit::from_payload(cosine_similarity(&p.vector, &vector), &p.payload))
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn fetch_product(&self, product_id: &str) -> Result<Product, StoreError> {
        let points = self.points.lock();
        points
            .iter()
            .find(|p| payload_str(&p.payload, "product_id").as_deref() == Some(product_id))
            .map(|p| product_from_payload(&p.payload))
            .ok_or_else(|| StoreError::ProductNotFound {
                product_id: product_id.to_string(),
            })
    }

    async fn delete_product(&self, product_id: &str) -> Result<(), StoreError> {
        let mut points = self.points.lock();
        points.retain(|p| payload_str(&p.payload, "product_id").as_deref() != Some(product_id));
        Ok(())
    }

    async fn scroll_products(&self, filter: Filter, limit: u32) -> Result<Vec<Product>, StoreError> {
        let points = self.points.lock();
        Ok(points
            .iter()
            .filter(|p| matches_filter(&p.payload, &filter))
            .take(limit as usize)
            .map(|p| product_from_payload(&p.payload))
            .collect())
    }
}
