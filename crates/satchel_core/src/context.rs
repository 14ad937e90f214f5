//! The application-root sync context.

use crate::engine::SyncEngine;
use crate::ops::{Ops, Record};
use crate::queue::DurableQueue;
use crate::retry::RetryConfig;
use crate::status::{Subscription, SyncState};
use satchel_protocol::{Document, PendingOperation};
use satchel_remote::{EndpointClient, RemoteEndpoint};
use satchel_store::{share, CacheStore, InMemoryBackend, KeyValueBackend, SharedBackend, StoreResult};
use std::sync::Arc;

/// The root object owning the whole sync layer.
///
/// One context per application, created at the root and shared by
/// cloning (clones are cheap handles to the same engine). Every
/// [`Ops`] facade, status subscription, and flush request goes through
/// it; there is no hidden global state anywhere in the crate.
///
/// # Example
///
/// ```rust,ignore
/// let context = SyncContext::builder()
///     .backend(FileBackend::open(&data_dir)?)
///     .endpoint(HttpEndpointClient::new("https://api.example.com/sync"))
///     .build();
///
/// let bookings: Ops<Booking> = context.ops("bookings");
/// let _indicator = context.subscribe(|state| update_badge(state));
/// ```
#[derive(Clone)]
pub struct SyncContext {
    engine: Arc<SyncEngine>,
}

impl SyncContext {
    /// Starts building a context.
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    /// Returns the operations facade for a collection.
    pub fn ops<T: Record>(&self, collection: impl Into<String>) -> Ops<T> {
        Ops::new(collection.into(), Arc::clone(&self.engine))
    }

    /// Subscribes to status transitions; the callback gets the current
    /// snapshot synchronously before this returns.
    pub fn subscribe(
        &self,
        callback: impl Fn(SyncState) + Send + Sync + 'static,
    ) -> Subscription {
        self.engine.broadcaster().subscribe(callback)
    }

    /// Returns the current status snapshot.
    pub fn status(&self) -> SyncState {
        self.engine.broadcaster().state()
    }

    /// Requests a flush of the pending queue. Always accepted; a no-op
    /// only when nothing is pending.
    pub fn flush(&self) {
        self.engine.flush();
    }

    /// Feeds a connectivity signal transition from the host. Regaining
    /// connectivity with a backlog triggers a flush.
    pub fn set_online(&self, online: bool) {
        self.engine.set_online(online);
    }

    /// Returns the current connectivity belief.
    pub fn is_online(&self) -> bool {
        self.engine.is_online()
    }

    /// Returns all pending operations in replay order.
    pub fn pending(&self) -> Vec<PendingOperation> {
        self.engine.queue().snapshot()
    }

    /// Returns the number of pending operations.
    pub fn pending_count(&self) -> usize {
        self.engine.queue().len()
    }

    /// Returns the cached documents of a collection, untyped.
    pub fn raw_documents(&self, collection: &str) -> Vec<Document> {
        self.engine.cached_documents(collection)
    }

    /// Returns the names of all collections the backend has stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be enumerated.
    pub fn collection_names(&self) -> StoreResult<Vec<String>> {
        self.engine.cache().collection_names()
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SyncContext`].
///
/// Defaults: an in-memory backend, no endpoint (local-only mode), and
/// the default retry curve.
pub struct SyncContextBuilder {
    backend: Option<Box<dyn KeyValueBackend>>,
    client: Option<Box<dyn EndpointClient>>,
    retry: RetryConfig,
}

impl SyncContextBuilder {
    fn new() -> Self {
        Self {
            backend: None,
            client: None,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the persistence backend.
    pub fn backend(mut self, backend: impl KeyValueBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Sets the remote endpoint client. Without one the context runs in
    /// permanent local-only mode.
    pub fn endpoint(mut self, client: impl EndpointClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    /// Sets the retry configuration for flush passes.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the context, restoring any persisted queue and cache.
    pub fn build(self) -> SyncContext {
        let backend: SharedBackend = share(
            self.backend
                .unwrap_or_else(|| Box::new(InMemoryBackend::new())),
        );

        let cache = CacheStore::from_shared(SharedBackend::clone(&backend));
        let queue = DurableQueue::open(backend);
        let remote = match self.client {
            Some(client) => RemoteEndpoint::from_client(client),
            None => RemoteEndpoint::unconfigured(),
        };

        SyncContext {
            engine: Arc::new(SyncEngine::new(cache, queue, remote, self.retry)),
        }
    }
}

impl Default for SyncContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyncContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContextBuilder")
            .field("has_backend", &self.backend.is_some())
            .field("has_endpoint", &self.client.is_some())
            .finish_non_exhaustive()
    }
}
