//! Payload mapping between [`Product`] values and vector-store points.
//!
//! One point per variant. The full product is denormalized into every
//! point's payload so a hit can be turned back into a product without a
//! second lookup.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ListValue, Value};

use crate::product::{Product, ProductStatus, ProductVariant};

/// Payload key prefix for free-form attributes.
const ATTR_PREFIX: &str = "attr_";

/// A scored point read back from the store.
#[derive(Debug, Clone)]
pub struct StoredHit {
    pub score: f32,
    pub product: Product,
    pub variant_text: Option<String>,
}

impl StoredHit {
    pub fn from_payload(score: f32, payload: &HashMap<String, Value>) -> Self {
        Self {
            score,
            product: product_from_payload(payload),
            variant_text: payload_str(payload, "variant_text"),
        }
    }
}

fn string_list(values: &[String]) -> Value {
    Value {
        kind: Some(Kind::ListValue(ListValue {
            values: values.iter().map(|v| Value::from(v.clone())).collect(),
        })),
    }
}

/// Builds the denormalized payload for one variant point.
pub fn build_payload(product: &Product, variant: &ProductVariant) -> HashMap<String, Value> {
    let mut payload: HashMap<String, Value> = HashMap::new();

    payload.insert("product_id".to_string(), product.id.clone().into());
    payload.insert("variant_id".to_string(), variant.id.clone().into());
    payload.insert("variant_text".to_string(), variant.text.clone().into());
    payload.insert("product_name".to_string(), product.name.clone().into());
    payload.insert("category".to_string(), product.category.clone().into());
    payload.insert("description".to_string(), product.description.clone().into());
    payload.insert("price".to_string(), product.price.into());
    payload.insert("currency".to_string(), product.currency.clone().into());
    payload.insert("brand".to_string(), product.brand.clone().into());
    payload.insert("color".to_string(), product.color.clone().into());
    payload.insert("size".to_string(), product.size.clone().into());
    payload.insert("material".to_string(), product.material.clone().into());
    payload.insert("style".to_string(), product.style.clone().into());
    payload.insert("gender".to_string(), product.gender.clone().into());
    payload.insert("occasion".to_string(), product.occasion.clone().into());
    payload.insert("status".to_string(), product.status.as_str().into());
    payload.insert("created_at".to_string(), product.created_at.timestamp().into());
    payload.insert("updated_at".to_string(), product.updated_at.timestamp().into());

    if !product.tags.is_empty() {
        payload.insert("tags".to_string(), string_list(&product.tags));
    }
    if !product.image_urls.is_empty() {
        payload.insert("image_urls".to_string(), string_list(&product.image_urls));
    }

    for (key, value) in &product.attributes {
        payload.insert(format!("{ATTR_PREFIX}{key}"), value.clone().into());
    }

    payload
}

pub fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn payload_f64(payload: &HashMap<String, Value>, key: &str) -> Option<f64> {
    payload.get(key).and_then(|v| v.as_double())
}

pub fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
    payload.get(key).and_then(|v| v.as_integer())
}

fn payload_str_list(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
    let Some(value) = payload.get(key) else {
        return Vec::new();
    };
    let Some(Kind::ListValue(list)) = &value.kind else {
        return Vec::new();
    };
    list.values
        .iter()
        .filter_map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

fn timestamp(payload: &HashMap<String, Value>, key: &str) -> DateTime<Utc> {
    payload_i64(payload, key)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_default()
}

/// Reconstructs a product from a point payload. Missing fields fall
/// back to empty values rather than failing the whole hit.
pub fn product_from_payload(payload: &HashMap<String, Value>) -> Product {
    let attributes = payload
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(ATTR_PREFIX).and_then(|attr_key| {
                value
                    .as_str()
                    .map(|v| (attr_key.to_string(), v.to_string()))
            })
        })
        .collect();

    Product {
        id: payload_str(payload, "product_id").unwrap_or_default(),
        name: payload_str(payload, "product_name").unwrap_or_default(),
        category: payload_str(payload, "category").unwrap_or_default(),
        description: payload_str(payload, "description").unwrap_or_default(),
        price: payload_f64(payload, "price").unwrap_or_default(),
        currency: payload_str(payload, "currency").unwrap_or_default(),
        brand: payload_str(payload, "brand").unwrap_or_default(),
        color: payload_str(payload, "color").unwrap_or_default(),
        size: payload_str(payload, "size").unwrap_or_default(),
        material: payload_str(payload, "material").unwrap_or_default(),
        style: payload_str(payload, "style").unwrap_or_default(),
        gender: payload_str(payload, "gender").unwrap_or_default(),
        occasion: payload_str(payload, "occasion").unwrap_or_default(),
        image_urls: payload_str_list(payload, "image_urls"),
        tags: payload_str_list(payload, "tags"),
        attributes,
        status: payload_str(payload, "status")
            .and_then(|s| ProductStatus::parse(&s))
            .unwrap_or(ProductStatus::Active),
        created_at: timestamp(payload, "created_at"),
        updated_at: timestamp(payload, "updated_at"),
    }
}
