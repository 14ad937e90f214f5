//! The durable pending write queue.

use parking_lot::Mutex;
use satchel_protocol::{PendingOperation, WriteQueue};
use satchel_store::{SharedBackend, StoreError, StoreResult};
use tracing::warn;

const QUEUE_KEY: &str = "satchel.pending";

/// A write queue persisted through the shared key/value backend.
///
/// `append` persists before returning, so a crash or reload cannot lose
/// a write; `open` restores whatever a previous session left behind,
/// preserving order and attempt counts. When persistence itself fails
/// the in-memory queue stays authoritative, matching the cache store's
/// discipline.
pub struct DurableQueue {
    backend: SharedBackend,
    queue: Mutex<WriteQueue>,
}

impl DurableQueue {
    /// Opens the queue, restoring any persisted operations.
    pub fn open(backend: SharedBackend) -> Self {
        let queue = {
            let guard = backend.lock();
            match guard.get(QUEUE_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<PendingOperation>>(&raw) {
                    Ok(entries) => WriteQueue::from_entries(entries),
                    Err(e) => {
                        warn!(error = %e, "discarding corrupt persisted queue");
                        WriteQueue::new()
                    }
                },
                Ok(None) => WriteQueue::new(),
                Err(e) => {
                    warn!(error = %e, "failed to read persisted queue");
                    WriteQueue::new()
                }
            }
        };

        Self {
            backend,
            queue: Mutex::new(queue),
        }
    }

    /// Appends an operation and persists the queue before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the operation is still
    /// queued in memory.
    pub fn append(&self, operation: PendingOperation) -> StoreResult<()> {
        let mut queue = self.queue.lock();
        queue.append(operation);
        self.persist(&queue)
    }

    /// Removes the head after remote acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the removal fails; the head is
    /// still removed in memory.
    pub fn acknowledge_head(&self) -> StoreResult<Option<PendingOperation>> {
        let mut queue = self.queue.lock();
        let acknowledged = queue.acknowledge_head();
        self.persist(&queue)?;
        Ok(acknowledged)
    }

    /// Increments the head's attempt counter.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the counter fails.
    pub fn record_attempt(&self) -> StoreResult<()> {
        let mut queue = self.queue.lock();
        queue.record_attempt();
        self.persist(&queue)
    }

    /// Returns a clone of the head operation, if any.
    pub fn head(&self) -> Option<PendingOperation> {
        self.queue.lock().head().cloned()
    }

    /// Returns the number of pending operations.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Returns all pending operations in order.
    pub fn snapshot(&self) -> Vec<PendingOperation> {
        self.queue.lock().snapshot()
    }

    /// Returns the pending operations targeting one collection, in order.
    pub fn snapshot_for(&self, collection: &str) -> Vec<PendingOperation> {
        self.queue
            .lock()
            .iter()
            .filter(|op| op.collection == collection)
            .cloned()
            .collect()
    }

    fn persist(&self, queue: &WriteQueue) -> StoreResult<()> {
        let raw = serde_json::to_string(&queue.snapshot())
            .map_err(|e| StoreError::serialization(QUEUE_KEY, e))?;
        self.backend.lock().set(QUEUE_KEY, &raw)
    }
}

impl std::fmt::Debug for DurableQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableQueue")
            .field("pending", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_protocol::Document;
    use satchel_store::{share, InMemoryBackend, SharedBackend};
    use serde_json::json;

    fn backend() -> SharedBackend {
        share(Box::new(InMemoryBackend::new()))
    }

    fn make_op(id: &str) -> PendingOperation {
        PendingOperation::upsert("bookings", Document::new(json!({"id": id})).unwrap())
    }

    #[test]
    fn append_then_acknowledge() {
        let queue = DurableQueue::open(backend());

        queue.append(make_op("a")).unwrap();
        queue.append(make_op("b")).unwrap();
        assert_eq!(queue.len(), 2);

        let acked = queue.acknowledge_head().unwrap().unwrap();
        assert_eq!(acked.collection, "bookings");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn survives_reload() {
        let shared = backend();

        {
            let queue = DurableQueue::open(SharedBackend::clone(&shared));
            queue.append(make_op("a")).unwrap();
            queue.append(make_op("b")).unwrap();
            queue.record_attempt().unwrap();
        }

        let reloaded = DurableQueue::open(shared);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.head().unwrap().attempts, 1);
    }

    #[test]
    fn acknowledged_operations_do_not_come_back() {
        let shared = backend();

        {
            let queue = DurableQueue::open(SharedBackend::clone(&shared));
            queue.append(make_op("a")).unwrap();
            queue.append(make_op("b")).unwrap();
            queue.acknowledge_head().unwrap();
        }

        let reloaded = DurableQueue::open(shared);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn corrupt_persisted_queue_degrades_to_empty() {
        let shared = backend();
        shared.lock().set(QUEUE_KEY, "][").unwrap();

        let queue = DurableQueue::open(shared);
        assert!(queue.is_empty());
    }

    #[test]
    fn snapshot_for_filters_by_collection() {
        let queue = DurableQueue::open(backend());

        queue.append(make_op("a")).unwrap();
        queue.append(PendingOperation::delete("patients", "p1")).unwrap();

        assert_eq!(queue.snapshot_for("bookings").len(), 1);
        assert_eq!(queue.snapshot_for("patients").len(), 1);
        assert_eq!(queue.snapshot_for("inventory").len(), 0);
    }

    #[test]
    fn append_keeps_operation_in_memory_on_quota_failure() {
        let shared = share(Box::new(InMemoryBackend::with_quota(16)));
        let queue = DurableQueue::open(shared);

        let err = queue.append(make_op("a")).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(queue.len(), 1);
    }
}
