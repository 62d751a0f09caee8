//! Scripted chat backend for tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::error::LlmError;
use super::types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, FunctionCall};
use super::ChatBackend;

/// Chat backend that replays a queue of scripted responses in order.
///
/// An empty queue yields an `Upstream` error, which exercises the same
/// degraded paths a dead endpoint would.
#[derive(Clone, Default)]
pub struct MockChatBackend {
    script: Arc<Mutex<VecDeque<Result<ChatResponse, LlmError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockChatBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a plain-text assistant reply.
    pub fn push_text(&self, content: impl Into<String>) {
        self.push_response(ChatResponse {
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: Some(content.into()),
                    function_call: None,
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
            error: None,
        });
    }

    /// Queues a function-call reply with the given JSON arguments.
    pub fn push_function_call(&self, name: impl Into<String>, arguments: impl Into<String>) {
        self.push_response(ChatResponse {
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: None,
                    function_call: Some(FunctionCall {
                        name: name.into(),
                        arguments: arguments.into(),
                    }),
                },
                finish_reason: Some("function_call".to_string()),
            }],
            usage: None,
            error: None,
        });
    }

    /// Queues a reply with no choices at all.
    pub fn push_empty(&self) {
        self.push_response(ChatResponse {
            choices: vec![],
            usage: None,
            error: None,
        });
    }

    /// Queues an upstream failure.
    pub fn push_error(&self, status: u16, body: impl Into<String>) {
        self.script.lock().push_back(Err(LlmError::Upstream {
            status,
            body: body.into(),
        }));
    }

    pub fn push_response(&self, response: ChatResponse) {
        self.script.lock().push_back(Ok(response));
    }

    /// Number of chat calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ChatBackend for MockChatBackend {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or(Err(LlmError::Upstream {
            status: 503,
            body: "mock script exhausted".to_string(),
        }))
    }
}
