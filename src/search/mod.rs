//! Retrieval orchestration: intent → store filter → ranked results.


use qdrant_client::qdrant::{Condition, Filter, Range};
use serde::Serialize;
use tracing::warn;

use crate::intent::ParsedIntent;
use crate::product::Product;
use crate::store::{StoreError, StoredHit, VectorStore};

/// Score above which a hit is labeled a high semantic match.
pub const DEFAULT_HIGH_SCORE: f32 = 0.9;

/// Score above which a hit is labeled a good semantic match.
pub const DEFAULT_GOOD_SCORE: f32 = 0.7;

/// Similarity tier thresholds for match-reason wording. Presentation
/// heuristics; configurable rather than fixed.
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    pub high: f32,
    pub good: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_SCORE,
            good: DEFAULT_GOOD_SCORE,
        }
    }
}

/// A scored match returned to the caller. Read-only, constructed per query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub product: Product,
    pub score: f32,
    pub match_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Builds the store filter for an intent.
///
/// Every present scalar field becomes an exact-match `must` clause; the
/// price bounds collapse into one range clause; free-form filter entries
/// become additional `must` clauses; and a `status = active` clause is
/// always appended last so inactive or deleted products can never
/// surface, whatever the intent says.
pub fn intent_filter(intent: &ParsedIntent) -> Filter {
    let mut must = Vec::new();

    let scalar_fields = [
        ("color", &intent.color),
        ("brand", &intent.brand),
        ("size", &intent.size),
        ("material", &intent.material),
        ("style", &intent.style),
        ("occasion", &intent.occasion),
        ("gender", &intent.gender),
    ];

    for (key, value) in scalar_fields {
        if let Some(value) = value
            && !value.is_empty()
        {
            must.push(Condition::matches(key, value.clone()));
        }
    }

    if intent.price_min.is_some() || intent.price_max.is_some() {
        must.push(Condition::range(
            "price",
            Range {
                gte: intent.price_min,
                lte: intent.price_max,
                ..Range::default()
            },
        ));
    }

    for (key, value) in &intent.filters {
        match value {
            serde_json::Value::String(s) => {
                must.push(Condition::matches(key.clone(), s.clone()));
            }
            serde_json::Value::Bool(b) => {
                must.push(Condition::matches(key.clone(), *b));
            }
            serde_json::Value::Number(n) if n.is_i64() => {
                must.push(Condition::matches(key.clone(), n.as_i64().unwrap_or(0)));
            }
            other => {
                warn!(key, value = %other, "Skipping unsupported dynamic filter value");
            }
        }
    }

    must.push(Condition::matches("status", "active".to_string()));

    Filter {
        must,
        ..Filter::default()
    }
}

/// Two-part human-readable match explanation: a similarity tier label
/// plus the filter dimensions that were active for this query, in fixed
/// brand/color/price/size order.
pub fn match_reason(score: f32, intent: &ParsedIntent, thresholds: &MatchThresholds) -> String {
    let tier = if score > thresholds.high {
        "high semantic match"
    } else if score > thresholds.good {
        "good semantic match"
    } else {
        "basic semantic match"
    };

    let mut dimensions = Vec::new();
    if intent.brand.as_deref().is_some_and(|v| !v.is_empty()) {
        dimensions.push("brand match");
    }
    if intent.color.as_deref().is_some_and(|v| !v.is_empty()) {
        dimensions.push("color match");
    }
    if intent.price_min.is_some() || intent.price_max.is_some() {
        dimensions.push("price range match");
    }
    if intent.size.as_deref().is_some_and(|v| !v.is_empty()) {
        dimensions.push("size match");
    }

    if dimensions.is_empty() {
        tier.to_string()
    } else {
        format!("{tier} + {}", dimensions.join(", "))
    }
}

fn to_search_result(hit: StoredHit, intent: &ParsedIntent, thresholds: &MatchThresholds) -> SearchResult {
    SearchResult {
        match_reason: match_reason(hit.score, intent, thresholds),
        product: hit.product,
        score: hit.score,
        variant: hit.variant_text,
    }
}

/// Issues one similarity query and assembles ranked results.
///
/// Hits keep the store's own ordering; score ties are not re-sorted.
/// Zero matches is an empty result set, not an error.
pub async fn run_search<S: VectorStore>(
    store: &S,
    vector: Vec<f32>,
    filter: Filter,
    limit: u64,
    intent: &ParsedIntent,
    thresholds: &MatchThresholds,
) -> Result<Vec<SearchResult>, StoreError> {
    let hits = store.query(vector, filter, limit).await?;
    Ok(hits
        .into_iter()
        .map(|hit| to_search_result(hit, intent, thresholds))
        .collect())
}
