//! Query interpretation: free text → structured search intent.
//!
//! Parsing goes through a function-calling chat endpoint; validation and
//! enhancement are pure and local. Callers must treat parse failures as
//! degradable (the raw query text becomes the product type) so search
//! never hard-fails on an interpretation problem.

pub mod error;
pub mod normalize;


pub use error::IntentError;

use std::collections::HashMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::{ChatBackend, ChatMessage, ChatRequest, FunctionSpec};

/// Function name the model is forced to call during parsing.
pub const INTENT_FUNCTION_NAME: &str = "extract_product_intent";

/// Suggestions returned when the caller does not ask for a count.
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

/// Hard cap on the suggestion count a caller may request.
pub const MAX_SUGGESTION_COUNT: usize = 20;

/// Sampling temperature for intent extraction. Low, for consistency.
const PARSE_TEMPERATURE: f32 = 0.1;

/// Sampling temperature for query suggestions. Higher, for variety.
const SUGGEST_TEMPERATURE: f32 = 0.7;

const PARSE_SYSTEM_PROMPT: &str = "You are a product-search query parser. \
Analyze the user's natural-language shopping query and extract the product \
type, attributes (color, brand, size, material, style) and constraints \
(price range, occasion, gender). Only extract what the query explicitly \
states; never guess missing values.";

const SUGGEST_SYSTEM_PROMPT: &str = "You are a shopping search assistant. \
Given a partial query, produce 5 complete, natural search suggestions that \
cover different attributes and price ranges. Reply with a JSON array of \
strings, each suggestion at most 20 words.";

/// Structured representation of a shopping query. Immutable once
/// validated; consumed to build a store filter and a search string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    /// Dynamic filter conditions with no dedicated field.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filters: HashMap<String, serde_json::Value>,
}

impl ParsedIntent {
    /// An intent carrying only the raw query text, used when parsing fails.
    pub fn from_raw_query(query: &str) -> Self {
        Self {
            product_type: Some(query.to_string()),
            ..Self::default()
        }
    }

    /// Checks the intent's semantic invariants.
    ///
    /// Callers log a failure as a warning and keep going: an unvalidated
    /// intent still builds a usable (degraded) filter.
    pub fn validate(&self) -> Result<(), IntentError> {
        if self.product_type.as_deref().unwrap_or("").is_empty() {
            return Err(IntentError::Validation {
                reason: "product_type is required".to_string(),
            });
        }

        if let (Some(min), Some(max)) = (self.price_min, self.price_max)
            && min > max
        {
            return Err(IntentError::Validation {
                reason: "price_min cannot be greater than price_max".to_string(),
            });
        }

        if self.price_min.is_some_and(|v| v < 0.0) {
            return Err(IntentError::Validation {
                reason: "price_min cannot be negative".to_string(),
            });
        }

        if self.price_max.is_some_and(|v| v < 0.0) {
            return Err(IntentError::Validation {
                reason: "price_max cannot be negative".to_string(),
            });
        }

        Ok(())
    }

    /// Normalizes product type, color and size through the lookup
    /// tables. Pure and deterministic; unmapped values pass through.
    pub fn enhance(&self) -> EnhancedIntent {
        let mut enhanced = self.clone();

        if let Some(product_type) = &enhanced.product_type
            && let Some(canonical) = normalize::product_type_synonym(product_type)
        {
            enhanced.product_type = Some(canonical.to_string());
        }

        if let Some(color) = &enhanced.color
            && let Some(canonical) = normalize::canonical_color(color)
        {
            enhanced.color = Some(canonical.to_string());
        }

        if let Some(size) = &enhanced.size
            && let Some(canonical) = normalize::canonical_size(size)
        {
            enhanced.size = Some(canonical.to_string());
        }

        EnhancedIntent { intent: enhanced }
    }

    /// Text to embed for the similarity query: the product type when
    /// present, else empty (the caller falls back to the raw query).
    pub fn search_query(&self) -> &str {
        self.product_type.as_deref().unwrap_or("")
    }
}

/// A normalized copy of a [`ParsedIntent`]. Created once per query and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedIntent {
    #[serde(flatten)]
    intent: ParsedIntent,
}

impl EnhancedIntent {
    pub fn intent(&self) -> &ParsedIntent {
        &self.intent
    }
}

impl Deref for EnhancedIntent {
    type Target = ParsedIntent;

    fn deref(&self) -> &ParsedIntent {
        &self.intent
    }
}

/// JSON schema the model fills in when parsing a query.
pub fn intent_function_spec() -> FunctionSpec {
    FunctionSpec {
        name: INTENT_FUNCTION_NAME.to_string(),
        description: "Extract structured product search intent from a natural-language query"
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "product_type": { "type": "string", "description": "Kind of product being searched for" },
                "color": { "type": "string" },
                "brand": { "type": "string" },
                "size": { "type": "string" },
                "material": { "type": "string" },
                "style": { "type": "string" },
                "occasion": { "type": "string" },
                "gender": { "type": "string" },
                "price_min": { "type": "number", "minimum": 0 },
                "price_max": { "type": "number", "minimum": 0 },
                "filters": {
                    "type": "object",
                    "description": "Any other exact-match constraints",
                    "additionalProperties": true
                }
            },
            "required": []
        }),
    }
}

/// Parses free-text queries via a function-calling chat endpoint.
pub struct IntentParser<C> {
    chat: C,
    model: String,
    max_tokens: u32,
}

impl<C: ChatBackend> IntentParser<C> {
    pub fn new(chat: C, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            chat,
            model: model.into(),
            max_tokens,
        }
    }

    /// Extracts a structured intent from `query`.
    pub async fn parse(&self, query: &str) -> Result<ParsedIntent, IntentError> {
        let request = ChatRequest::text(
            self.model.clone(),
            vec![
                ChatMessage::system(PARSE_SYSTEM_PROMPT),
                ChatMessage::user(format!("Parse this product search query: {query}")),
            ],
        )
        .with_function(intent_function_spec(), true)
        .with_max_tokens(self.max_tokens)
        .with_temperature(PARSE_TEMPERATURE);

        let response = self.chat.chat(request).await?;

        let call = response
            .first_function_call()
            .ok_or(IntentError::MissingFunctionCall)?;

        let intent: ParsedIntent =
            serde_json::from_str(&call.arguments).map_err(|e| IntentError::Decode {
                message: e.to_string(),
            })?;

        debug!(?intent, "Parsed query intent");
        Ok(intent)
    }

    /// Generates up to `limit` completion suggestions for a partial
    /// query. Falls back to a deterministic suffix list when the chat
    /// call fails or the reply is unusable, so this never errors.
    pub async fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        let request = ChatRequest::text(
            self.model.clone(),
            vec![
                ChatMessage::system(SUGGEST_SYSTEM_PROMPT),
                ChatMessage::user(format!("Suggest searches completing: {query}")),
            ],
        )
        .with_max_tokens(500)
        .with_temperature(SUGGEST_TEMPERATURE);

        let mut suggestions = match self.chat.chat(request).await {
            Ok(response) => {
                let content = response.first_text().unwrap_or_default();
                match serde_json::from_str::<Vec<String>>(content) {
                    Ok(suggestions) => suggestions,
                    Err(e) => {
                        warn!(error = %e, "Suggestion payload was not a JSON array, using defaults");
                        default_suggestions(query)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Suggestion call failed, using defaults");
                default_suggestions(query)
            }
        };

        suggestions.truncate(limit);
        suggestions
    }
}

/// Canned suggestions used when the model's reply is unusable.
/// Presentation heuristics, not correctness-critical.
pub fn default_suggestions(query: &str) -> Vec<String> {
    ["黑色", "白色", "100元以下", "品牌", "大码"]
        .iter()
        .map(|suffix| format!("{query} {suffix}"))
        .collect()
}
