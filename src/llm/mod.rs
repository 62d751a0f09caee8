//! OpenAI-compatible chat completion client.
//!
//! The pipeline talks to the chat endpoint through the [`ChatBackend`]
//! trait so tests can substitute a scripted backend.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;

pub use error::LlmError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockChatBackend;
pub use types::{
    ApiErrorBody, ChatChoice, ChatMessage, ChatRequest, ChatResponse, FunctionCall, FunctionSpec,
    TokenUsage,
};

use std::time::Duration;

use tracing::debug;

/// Anything that can execute a chat completion request.
pub trait ChatBackend: Send + Sync {
    /// Executes a single chat completion call.
    fn chat(
        &self,
        request: ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatResponse, LlmError>> + Send;
}

#[derive(Clone)]
/// Chat client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChatClient {
    /// Creates a client with a per-call timeout.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ChatBackend for OpenAiChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LlmError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Decode {
                message: e.to_string(),
            })?;

        if let Some(err) = parsed.error {
            return Err(LlmError::Api {
                message: err.message,
            });
        }

        if let Some(usage) = &parsed.usage {
            debug!(total_tokens = usage.total_tokens, "Chat request completed");
        }

        Ok(parsed)
    }
}
