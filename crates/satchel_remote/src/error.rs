//! Error types for remote calls.

use thiserror::Error;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur when calling the remote endpoint.
///
/// The split matters to the status state machine: connectivity failures
/// self-heal on reconnect, application failures need a manual retry or a
/// fix on the other side.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The endpoint could not be reached: no client is configured, or the
    /// transport failed before a response arrived.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered with its application-level error marker.
    #[error("endpoint reported an error: {0}")]
    Application(String),

    /// The endpoint answered with a payload that could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Returns true if this failure is connectivity-classified.
    ///
    /// Everything else means the endpoint was reached and answered badly.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RemoteError::Unreachable(_))
    }
}
