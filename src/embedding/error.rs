use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the embedding client and cache.
pub enum EmbeddingError {
    /// Caller passed zero texts.
    #[error("no texts provided for embedding")]
    EmptyInput,

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {message}")]
    ClientBuild {
        /// Error message.
        message: String,
    },

    /// The request never produced a response (timeout, connection refused).
    #[error("embedding request to '{url}' failed: {message}")]
    Request {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("embedding API returned status {status}: {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The API answered 200 but embedded an error payload.
    #[error("embedding API error: {message}")]
    Api {
        /// Upstream error message.
        message: String,
    },

    /// The response body was not parseable.
    #[error("failed to decode embedding response: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// The API returned a different number of vectors than texts sent.
    #[error("embedding count mismatch: sent {sent} texts, got {got} vectors")]
    CountMismatch {
        /// Texts sent.
        sent: usize,
        /// Vectors received.
        got: usize,
    },
}
