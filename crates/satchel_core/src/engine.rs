//! The sync engine: optimistic writes, FIFO flush, status classification.

use crate::error::{CoreError, CoreResult};
use crate::queue::DurableQueue;
use crate::reachability::Reachability;
use crate::retry::RetryConfig;
use crate::status::{StatusBroadcaster, SyncState, SyncStatus};
use satchel_protocol::{envelope, Document, PendingOperation, WriteIntent};
use satchel_remote::RemoteEndpoint;
use satchel_store::{upsert_by_id, CacheStore};
use tracing::{debug, warn};

/// The composition behind [`crate::SyncContext`] and [`crate::Ops`].
///
/// All methods take `&self`; shared state lives behind locks in the
/// component layers, so one engine can be shared across threads via
/// `Arc`. Nothing here fails to its caller - failures are classified
/// into the status taxonomy and published.
pub(crate) struct SyncEngine {
    cache: CacheStore,
    queue: DurableQueue,
    remote: RemoteEndpoint,
    reachability: Reachability,
    broadcaster: StatusBroadcaster,
    retry: RetryConfig,
}

impl SyncEngine {
    pub(crate) fn new(
        cache: CacheStore,
        queue: DurableQueue,
        remote: RemoteEndpoint,
        retry: RetryConfig,
    ) -> Self {
        let broadcaster = StatusBroadcaster::new();

        // A reloaded backlog must be visible in the very first snapshot.
        broadcaster.publish(SyncState {
            status: SyncStatus::Idle,
            pending_count: queue.len(),
        });

        Self {
            cache,
            queue,
            remote,
            reachability: Reachability::new(),
            broadcaster,
            retry,
        }
    }

    pub(crate) fn broadcaster(&self) -> &StatusBroadcaster {
        &self.broadcaster
    }

    pub(crate) fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub(crate) fn queue(&self) -> &DurableQueue {
        &self.queue
    }

    pub(crate) fn is_online(&self) -> bool {
        self.reachability.is_online()
    }

    /// Applies the host's connectivity signal.
    pub(crate) fn set_online(&self, online: bool) {
        self.reachability.set_online(online);

        if !online {
            self.publish(SyncStatus::Offline);
            return;
        }

        if self.queue.is_empty() {
            self.publish(SyncStatus::Idle);
        } else {
            self.publish(SyncStatus::Syncing);
            self.run_flush_pass();
        }
    }

    /// Manual flush request. Always accepted; a no-op only when the
    /// queue is empty.
    pub(crate) fn flush(&self) {
        if self.queue.is_empty() {
            self.publish(SyncStatus::Idle);
            return;
        }

        // An explicit retry overrides a stale offline belief.
        self.publish(SyncStatus::Syncing);
        self.run_flush_pass();
    }

    /// Optimistic local upsert plus a queued remote upsert.
    pub(crate) fn persist_document(&self, collection: &str, document: Document) {
        if let Err(e) = self.cache.upsert(collection, document.clone()) {
            self.note_local_failure(collection, &e.into());
        }
        self.enqueue(PendingOperation::upsert(collection, document));
    }

    /// Atomic local replace plus a queued remote replace.
    pub(crate) fn persist_all_documents(&self, collection: &str, documents: Vec<Document>) {
        if let Err(e) = self.cache.replace(collection, documents.clone()) {
            self.note_local_failure(collection, &e.into());
        }
        self.enqueue(PendingOperation::replace_all(collection, documents));
    }

    /// Local removal plus a queued remote delete intent.
    pub(crate) fn delete_document(&self, collection: &str, id: &str) {
        if let Err(e) = self.cache.remove(collection, id) {
            self.note_local_failure(collection, &e.into());
        }
        self.enqueue(PendingOperation::delete(collection, id));
    }

    /// Returns cached documents without touching the network.
    pub(crate) fn cached_documents(&self, collection: &str) -> Vec<Document> {
        self.cache.documents(collection)
    }

    /// Returns usable documents, reconciling with the remote when it
    /// answers. Never fails; offline callers get cached data.
    pub(crate) fn load_collection(&self, collection: &str) -> Vec<Document> {
        let cached = self.cache.documents(collection);

        if !self.remote.is_configured() {
            return cached;
        }

        match self.fetch_reconciled(collection) {
            Ok(documents) => {
                self.reachability.note_outcome(true);
                if let Err(e) = self.cache.replace(collection, documents.clone()) {
                    self.note_local_failure(collection, &e.into());
                }
                documents
            }
            Err(e) => {
                if e.is_connectivity() {
                    self.reachability.note_outcome(false);
                }
                debug!(collection, error = %e, "load kept cached data");
                cached
            }
        }
    }

    /// Fetches the authoritative remote array and overlays the writes
    /// still waiting in the queue, so a reconcile never hides a local
    /// write that has not been acknowledged yet (read-your-writes).
    fn fetch_reconciled(&self, collection: &str) -> CoreResult<Vec<Document>> {
        let payload = self.remote.fetch(&envelope::fetch_action(collection))?;
        let mut documents = Document::array_from_value(payload)?;

        for operation in self.queue.snapshot_for(collection) {
            match operation.intent {
                WriteIntent::Upsert { document } => {
                    upsert_by_id(&mut documents, document);
                }
                WriteIntent::ReplaceAll {
                    documents: replacement,
                } => {
                    documents.clear();
                    for document in replacement {
                        upsert_by_id(&mut documents, document);
                    }
                }
                WriteIntent::Delete { id } => {
                    documents.retain(|document| document.id() != id);
                }
            }
        }

        Ok(documents)
    }

    /// Queues an operation and lets reachability gate an immediate
    /// flush attempt.
    fn enqueue(&self, operation: PendingOperation) {
        if let Err(e) = self.queue.append(operation) {
            // Still queued in memory; flag the degraded persistence.
            self.note_local_failure("queue", &e.into());
        }

        if self.reachability.is_online() {
            self.publish(SyncStatus::Syncing);
            self.run_flush_pass();
        } else {
            self.publish(SyncStatus::Offline);
        }
    }

    /// Replays the queue head-first until it drains or a failure ends
    /// the pass. The head is never skipped: replay order must match
    /// local application order for the remote side to converge.
    fn run_flush_pass(&self) {
        loop {
            let Some(operation) = self.queue.head() else {
                self.publish(SyncStatus::Idle);
                return;
            };

            match self.deliver_head(&operation) {
                Ok(()) => {
                    self.reachability.note_outcome(true);
                    if !self.queue.is_empty() {
                        self.publish(SyncStatus::Syncing);
                    }
                }
                Err(e) if e.is_connectivity() => {
                    self.reachability.note_outcome(false);
                    debug!(op_id = %operation.op_id, "flush paused: endpoint unreachable");
                    self.publish(SyncStatus::Offline);
                    return;
                }
                Err(e) => {
                    warn!(op_id = %operation.op_id, error = %e, "flush stopped: operation kept for manual retry");
                    self.publish(SyncStatus::Error);
                    return;
                }
            }
        }
    }

    /// Delivers the head operation with per-pass retries, then removes
    /// it from the queue on acknowledgment.
    fn deliver_head(&self, operation: &PendingOperation) -> CoreResult<()> {
        let mut last = CoreError::Remote(satchel_remote::RemoteError::Unreachable(
            "no delivery attempted".to_string(),
        ));

        for attempt in 0..self.retry.max_attempts_per_pass {
            if attempt > 0 {
                std::thread::sleep(self.retry.delay_for_attempt(attempt));
            }

            if let Err(e) = self.queue.record_attempt() {
                warn!(error = %e, "failed to persist attempt counter");
            }

            match self.remote.deliver(&envelope::write_body(operation)) {
                Ok(_) => {
                    self.queue.acknowledge_head()?;
                    return Ok(());
                }
                Err(e) => {
                    debug!(
                        op_id = %operation.op_id,
                        attempt,
                        error = %e,
                        "delivery attempt failed"
                    );
                    last = e.into();
                }
            }
        }

        Err(last)
    }

    /// Logs a local (storage or codec) failure and surfaces it through
    /// the status. The in-memory change stays visible; these failures
    /// are not auto-retried because they will not self-resolve.
    pub(crate) fn note_local_failure(&self, context: &str, error: &CoreError) {
        warn!(context, error = %error, "local write degraded; in-memory state stays authoritative");
        self.publish(SyncStatus::Error);
    }

    fn publish(&self, status: SyncStatus) {
        self.broadcaster.publish(SyncState {
            status,
            pending_count: self.queue.len(),
        });
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("state", &self.broadcaster.state())
            .field("online", &self.is_online())
            .finish_non_exhaustive()
    }
}
