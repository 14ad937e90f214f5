//! # Satchel Remote
//!
//! The remote endpoint adapter for the Satchel sync layer.
//!
//! This crate provides:
//! - [`EndpointClient`] - the wire abstraction (GET-style reads with a
//!   cache-busting token, POST-style writes with a JSON body)
//! - [`HttpEndpointClient`] - a blocking HTTP implementation
//! - [`MockEndpoint`] - a scriptable client for tests
//! - [`RemoteEndpoint`] - failure-classifying adapter over any client
//!
//! ## Failure contract
//!
//! The adapter never panics and never lets a transport exception escape.
//! Internally every failure is an explicit [`RemoteError`] variant so the
//! engine can tell connectivity trouble from application trouble; the soft
//! [`RemoteEndpoint::call`] surface collapses all of them to `None` for
//! callers that only need the "no result means unreachable" contract.
//! A missing endpoint is not an error state: local-only operation is a
//! first-class permanent mode.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod endpoint;
mod error;
mod mock;

pub use client::{EndpointClient, HttpEndpointClient};
pub use endpoint::RemoteEndpoint;
pub use error::{RemoteError, RemoteResult};
pub use mock::{MockEndpoint, RecordedCall};
