//! Product domain model.
//!
//! Products are owned by callers; the pipeline reads them to generate
//! variants and writes them, denormalized, into vector-store payloads.
//! Known attributes are typed fields; anything else lives in the
//! explicit `attributes` overflow map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a product. Only `Active` products are ever
/// returned from search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
    Deleted,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProductStatus::Active),
            "inactive" => Some(ProductStatus::Inactive),
            "deleted" => Some(ProductStatus::Deleted),
            _ => None,
        }
    }
}

/// A product record as stored (denormalized) in the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub occasion: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form attributes with no dedicated field.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One generated textual description of a product plus its embedding.
/// Ephemeral: embedded and persisted as one vector-store point, never
/// updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub generated_at: DateTime<Utc>,
}

/// Caller-supplied product payload, before the pipeline assigns
/// identity and lifecycle fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub occasion: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl ProductDraft {
    /// Promotes the draft to a full product: fresh uuid, active status,
    /// both timestamps set to now.
    pub fn into_product(self) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            currency: self.currency,
            brand: self.brand,
            color: self.color,
            size: self.size,
            material: self.material,
            style: self.style,
            gender: self.gender,
            occasion: self.occasion,
            image_urls: self.image_urls,
            tags: self.tags,
            attributes: self.attributes,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied to an existing product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub style: Option<String>,
    pub gender: Option<String>,
    pub occasion: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub attributes: Option<HashMap<String, String>>,
    pub status: Option<ProductStatus>,
}

impl Product {
    /// Applies the set fields of `patch` and bumps `updated_at`.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(material) = patch.material {
            self.material = material;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(occasion) = patch.occasion {
            self.occasion = occasion;
        }
        if let Some(image_urls) = patch.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(attributes) = patch.attributes {
            self.attributes = attributes;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

/// Outcome of a batch import. Individual item failures never abort the
/// batch; each is recorded here instead.
#[derive(Debug, Clone, Serialize)]
pub struct BatchImportReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchImportFailure>,
    pub process_id: String,
}

/// One failed batch item.
#[derive(Debug, Clone, Serialize)]
pub struct BatchImportFailure {
    pub index: usize,
    pub product: String,
    pub error: String,
}
