//! # Satchel Core
//!
//! The local-first sync engine for Satchel.
//!
//! This crate composes the store, protocol, and remote layers into the
//! surface feature modules actually use:
//! - [`SyncContext`] - the application-root context object owning cache,
//!   queue, reachability, and status
//! - [`Ops`] - the uniform per-collection facade
//!   (`load` / `persist` / `persist_all` / `delete`)
//! - [`StatusBroadcaster`] - the `{status, pending_count}` state machine
//!   with synchronous publish/subscribe
//! - [`DurableQueue`] - the reload-surviving pending write queue
//! - [`RetryConfig`] - capped exponential backoff with jitter
//!
//! ## Architecture
//!
//! Writes are optimistic: the local cache is updated synchronously, the
//! write intent is queued durably, and the reachability monitor gates an
//! immediate flush attempt. Reads come from the cache and reconcile with
//! a remote fetch when the endpoint answers. No operation on the [`Ops`]
//! facade ever fails to its caller; trouble is visible only through the
//! status snapshot.
//!
//! ## Key Invariants
//!
//! - `pending_count` always equals the queue length
//! - A queued operation is removed only on remote acknowledgment
//! - Flush replays in FIFO order and never skips the head
//! - The in-memory cache stays authoritative when persistence fails

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod engine;
mod error;
mod ops;
mod queue;
mod reachability;
mod retry;
mod status;

pub use context::{SyncContext, SyncContextBuilder};
pub use error::{CoreError, CoreResult};
pub use ops::{Ops, Record};
pub use queue::DurableQueue;
pub use reachability::Reachability;
pub use retry::RetryConfig;
pub use status::{StatusBroadcaster, Subscription, SyncState, SyncStatus};

pub use satchel_protocol::{Document, PendingOperation, WriteIntent};
pub use satchel_remote::{EndpointClient, HttpEndpointClient, MockEndpoint, RemoteEndpoint};
pub use satchel_store::{FileBackend, InMemoryBackend, KeyValueBackend};
