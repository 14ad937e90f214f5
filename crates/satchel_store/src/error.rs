//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while persisting local state.
///
/// None of these are fatal to the session: callers keep their in-memory
/// state and surface the failure through the sync status instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A write would push the backend past its capacity ceiling.
    #[error("quota exceeded writing key {key:?}: {attempted} bytes against a {limit} byte ceiling")]
    QuotaExceeded {
        /// The key being written.
        key: String,
        /// Total bytes the write would have brought the backend to.
        attempted: usize,
        /// The backend's capacity ceiling in bytes.
        limit: usize,
    },

    /// A value could not be serialized or deserialized.
    #[error("serialization failed for key {key:?}: {message}")]
    Serialization {
        /// The key being encoded or decoded.
        key: String,
        /// The underlying codec message.
        message: String,
    },
}

impl StoreError {
    /// Creates a serialization error for the given key.
    pub fn serialization(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            key: key.into(),
            message: err.to_string(),
        }
    }
}
