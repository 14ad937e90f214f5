//! Key/value backend trait definition.

use crate::error::StoreResult;
use parking_lot::Mutex;
use std::sync::Arc;

/// A backend shared between the cache store and the durable queue.
pub type SharedBackend = Arc<Mutex<Box<dyn KeyValueBackend>>>;

/// A low-level key/value backend for Satchel.
///
/// Backends are **opaque string stores**. They map string keys to string
/// values and know nothing about collections, documents, or queues - the
/// layers above own all encoding.
///
/// # Invariants
///
/// - `get` returns exactly the value previously written for that key
/// - `set` is durable when it returns `Ok` (to the backend's best ability)
/// - A backend may have a capacity ceiling; exceeding it returns
///   [`crate::StoreError::QuotaExceeded`] and must leave the previous
///   value for that key intact
/// - Backends must be `Send` so a shared backend can cross threads
///
/// # Implementors
///
/// - [`crate::InMemoryBackend`] - for tests and ephemeral sessions
/// - [`crate::FileBackend`] - for persistent storage
pub trait KeyValueBackend: Send {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or would exceed the backend's
    /// capacity ceiling.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes the value stored under `key`, if any.
    ///
    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// Returns all keys currently stored, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Wraps a backend for shared ownership.
pub fn share(backend: Box<dyn KeyValueBackend>) -> SharedBackend {
    Arc::new(Mutex::new(backend))
}
