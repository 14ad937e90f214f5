//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur inside the sync engine.
///
/// These never escape the [`crate::Ops`] facade; they exist so internal
/// layers compose with `?` and so failures can be classified into the
/// status taxonomy (connectivity vs application vs storage).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Local persistence failed (quota, I/O, serialization).
    #[error("store error: {0}")]
    Store(#[from] satchel_store::StoreError),

    /// The remote endpoint failed (unreachable, error marker, bad payload).
    #[error("remote error: {0}")]
    Remote(#[from] satchel_remote::RemoteError),

    /// A protocol value could not be built or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] satchel_protocol::ProtocolError),
}

impl CoreError {
    /// Returns true if this failure is connectivity-classified.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CoreError::Remote(e) if e.is_connectivity())
    }
}
