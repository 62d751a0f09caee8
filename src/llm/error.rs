use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the chat completion client.
pub enum LlmError {
    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {message}")]
    ClientBuild {
        /// Error message.
        message: String,
    },

    /// The request never produced a response (timeout, connection refused).
    #[error("chat request to '{url}' failed: {message}")]
    Request {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("chat API returned status {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated by the caller if needed).
        body: String,
    },

    /// The API answered 200 but embedded an error payload.
    #[error("chat API error: {message}")]
    Api {
        /// Upstream error message.
        message: String,
    },

    /// The response body was not parseable.
    #[error("failed to decode chat response: {message}")]
    Decode {
        /// Error message.
        message: String,
    },
}
