//! Error types for protocol operations.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while building or decoding protocol values.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A document payload was not a JSON object.
    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A document had a missing, empty, or non-string `id` field.
    #[error("document id must be a non-empty string")]
    MissingId,

    /// A remote payload did not have the expected shape.
    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),

    /// JSON encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
