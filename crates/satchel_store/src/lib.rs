//! # Satchel Store
//!
//! Local persistence for the Satchel sync layer.
//!
//! This crate provides:
//! - [`KeyValueBackend`] - the synchronous string key/value contract
//! - [`InMemoryBackend`] - for tests and ephemeral sessions
//! - [`FileBackend`] - durable, one file per key under a store directory
//! - [`CacheStore`] - collection name to document array, memory-authoritative
//!
//! ## Key Invariants
//!
//! - Quota exhaustion is recoverable, never fatal
//! - The in-memory state stays authoritative when persistence fails
//! - Upsert-by-id preserves existing document order

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod cache;
mod error;
mod file;
mod memory;

pub use backend::{share, KeyValueBackend, SharedBackend};
pub use cache::{upsert_by_id, CacheStore};
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
