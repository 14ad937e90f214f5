//! # Satchel Protocol
//!
//! Shared data types for the Satchel sync layer.
//!
//! This crate provides:
//! - [`Document`] - a JSON-shaped record with a unique string `id`
//! - [`WriteIntent`] and [`PendingOperation`] - durable write descriptions
//! - [`WriteQueue`] - the ordered, replayable log of unacknowledged writes
//! - The wire envelope of the consumed remote endpoint (see [`envelope`])
//!
//! ## Key Invariants
//!
//! - A document always carries a non-empty string `id`
//! - Queue entries are in enqueue order; replay never reorders them
//! - An entry leaves the queue only through acknowledgment

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
pub mod envelope;
mod error;
mod operation;
mod queue;

pub use document::Document;
pub use error::{ProtocolError, ProtocolResult};
pub use operation::{PendingOperation, WriteIntent};
pub use queue::WriteQueue;
