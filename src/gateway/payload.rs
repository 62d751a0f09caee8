//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::product::ProductDraft;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchImportRequest {
    pub products: Vec<ProductDraft>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub count: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub product_id: String,
    pub variants: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub product_id: String,
    pub deleted: bool,
}
