use crate::llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by intent parsing and validation.
pub enum IntentError {
    /// The chat call itself failed.
    #[error("intent extraction call failed: {0}")]
    Upstream(#[from] LlmError),

    /// The model answered without the expected structured payload.
    #[error("chat response carried no function call")]
    MissingFunctionCall,

    /// The function-call arguments were not parseable into an intent.
    #[error("failed to decode intent arguments: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// The parsed intent is semantically invalid.
    #[error("invalid intent: {reason}")]
    Validation {
        /// What failed.
        reason: String,
    },
}
