//! Variant generation: one product → several natural-language
//! descriptions for indexing.
//!
//! The chat model is sampled at high temperature for diversity, so its
//! output shape is unreliable; parsing degrades from a JSON array to a
//! bracketed substring to line-based extraction. A validity post-filter
//! keeps only deduplicated, reasonably sized variants that actually
//! reference the product.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::VariantError;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::llm::{ChatBackend, ChatMessage, ChatRequest};
use crate::product::{Product, ProductVariant};
use crate::store::VectorStore;

/// Variant count used when the caller passes zero or negative.
pub const DEFAULT_VARIANT_COUNT: i32 = 5;

/// Upper bound on variants per product.
pub const MAX_VARIANT_COUNT: i32 = 20;

/// Minimum variant length (chars, after trimming).
const MIN_VARIANT_CHARS: usize = 5;

/// Maximum variant length (chars, after trimming).
const MAX_VARIANT_CHARS: usize = 100;

/// Placeholder value substituted for empty product fields so the prompt
/// never contains an empty slot.
const UNSPECIFIED: &str = "unspecified";

/// Sampling temperature for generation. High, favoring diversity.
const GENERATE_TEMPERATURE: f32 = 0.8;

/// Default prompt template. Placeholders are substituted with product
/// fields; empty fields become the literal "unspecified".
pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Generate {variant_count} different natural-language descriptions a shopper \
might use to search for this product:

Name: {product_name}
Category: {category}
Color: {color}
Price: {price}
Brand: {brand}
Size: {size}
Material: {material}
Description: {description}

Each description should be a short phrase naming the product, varying \
wording, emphasis and attributes. Reply with a JSON array of strings only.";

/// Generates product description variants via a chat endpoint.
pub struct VariantGenerator<C> {
    chat: C,
    model: String,
    max_tokens: u32,
    template: String,
}

impl<C: ChatBackend> VariantGenerator<C> {
    pub fn new(chat: C, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            chat,
            model: model.into(),
            max_tokens,
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    /// Replaces the prompt template (must use the same placeholders).
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Generates up to `count` validated variant texts for `product`.
    ///
    /// Returns an empty vec (not an error) when everything was filtered
    /// out; callers that need variants map that to
    /// [`VariantError::NoVariants`].
    pub async fn generate(&self, product: &Product, count: i32) -> Result<Vec<String>, VariantError> {
        let count = clamp_count(count);
        let prompt = self.build_prompt(product, count);

        let request = ChatRequest::text(self.model.clone(), vec![ChatMessage::user(prompt)])
            .with_max_tokens(self.max_tokens)
            .with_temperature(GENERATE_TEMPERATURE);

        let response = self.chat.chat(request).await?;
        let content = response.first_text().ok_or(VariantError::EmptyResponse)?;

        let candidates = match parse_variants(content) {
            Some(variants) => variants,
            None => {
                warn!("Variant reply was not JSON, falling back to line extraction");
                parse_variants_fallback(content)
            }
        };

        let variants = filter_variants(candidates, product);
        info!(
            product_id = %product.id,
            variants = variants.len(),
            "Generated product variants"
        );
        Ok(variants)
    }

    /// Generates variants and embeds them. Zero valid variants is
    /// [`VariantError::NoVariants`].
    pub async fn generate_with_embeddings<E: Embedder>(
        &self,
        product: &Product,
        count: i32,
        embedder: &E,
    ) -> Result<Vec<ProductVariant>, VariantError> {
        let texts = self.generate(product, count).await?;
        if texts.is_empty() {
            return Err(VariantError::NoVariants);
        }

        let vectors = embedder.embed_batch(&texts).await?;
        let generated_at = Utc::now();

        Ok(texts
            .into_iter()
            .zip(vectors)
            .map(|(text, vector)| ProductVariant {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                text,
                vector,
                generated_at,
            })
            .collect())
    }

    /// Replaces a product's indexed variants: fetch, delete, regenerate,
    /// re-insert.
    ///
    /// Not transactional. A failure after the delete leaves the product
    /// unsearchable until the next successful regeneration; that window
    /// is accepted rather than papered over with retries.
    pub async fn regenerate<E: Embedder, S: VectorStore>(
        &self,
        product_id: &str,
        count: i32,
        store: &S,
        embedder: &E,
    ) -> Result<usize, VariantError> {
        let product = store.fetch_product(product_id).await?;

        store.delete_product(product_id).await?;

        let variants = self
            .generate_with_embeddings(&product, count, embedder)
            .await?;

        store.upsert_variants(&product, &variants).await?;

        info!(product_id, variants = variants.len(), "Regenerated variants");
        Ok(variants.len())
    }

    fn build_prompt(&self, product: &Product, count: i32) -> String {
        let price = format!("{:.2}{}", product.price, product.currency);

        let substitutions = [
            ("{variant_count}", count.to_string()),
            ("{product_name}", product.name.clone()),
            ("{category}", product.category.clone()),
            ("{color}", product.color.clone()),
            ("{price}", price),
            ("{brand}", product.brand.clone()),
            ("{size}", product.size.clone()),
            ("{material}", product.material.clone()),
            ("{description}", product.description.clone()),
        ];

        let mut prompt = self.template.clone();
        for (placeholder, value) in substitutions {
            let value = if value.is_empty() {
                UNSPECIFIED.to_string()
            } else {
                value
            };
            prompt = prompt.replace(placeholder, &value);
        }
        prompt
    }
}

/// Clamps the requested count to [1, 20], defaulting to 5.
pub fn clamp_count(count: i32) -> i32 {
    if count <= 0 {
        DEFAULT_VARIANT_COUNT
    } else {
        count.min(MAX_VARIANT_COUNT)
    }
}

/// Parses the reply as a JSON string array, trying the whole content
/// first and then the first `[` … last `]` substring.
fn parse_variants(content: &str) -> Option<Vec<String>> {
    if let Ok(variants) = serde_json::from_str::<Vec<String>>(content) {
        return Some(variants);
    }

    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<Vec<String>>(&content[start..=end]).ok()
}

/// Line-based extraction for replies that are lists rather than JSON.
fn parse_variants_fallback(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();

            if line.is_empty()
                || line.starts_with("```")
                || line.starts_with('#')
                || line.starts_with("//")
            {
                return None;
            }

            let mut line = line
                .trim_start_matches('-')
                .trim_start_matches('*')
                .trim_start_matches('•');

            // Strip "1." / "2)" style ordinals.
            let stripped = line.trim_start();
            let digits = stripped.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 {
                let rest = &stripped[digits..];
                if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
                    line = rest;
                }
            }

            let line = line.trim_matches(|c: char| {
                c.is_whitespace() || c == '"' || c == '\'' || c == ','
            });

            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

/// Lowercase whitespace tokens (length > 1) from the product name and
/// category. A variant must contain at least one of these.
fn product_keywords(product: &Product) -> Vec<String> {
    product
        .name
        .split_whitespace()
        .chain(product.category.split_whitespace())
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() > 1)
        .collect()
}

/// Post-filter: length bounds, exact de-duplication (first occurrence
/// wins), and the product-reference check.
fn filter_variants(candidates: Vec<String>, product: &Product) -> Vec<String> {
    let keywords = product_keywords(product);
    let mut seen = std::collections::HashSet::new();
    let mut valid = Vec::new();

    for candidate in candidates {
        let variant = candidate.trim();

        let chars = variant.chars().count();
        if chars < MIN_VARIANT_CHARS || chars > MAX_VARIANT_CHARS {
            debug!(len = chars, "Discarding variant outside length bounds");
            continue;
        }

        if !seen.insert(variant.to_string()) {
            continue;
        }

        let lowered = variant.to_lowercase();
        if !keywords.is_empty() && !keywords.iter().any(|k| lowered.contains(k)) {
            debug!(variant, "Discarding variant that never references the product");
            continue;
        }

        valid.push(variant.to_string());
    }

    valid
}
