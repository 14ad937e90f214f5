//! Ordered log of unacknowledged writes.

use crate::operation::PendingOperation;
use std::collections::VecDeque;

/// An ordered queue of pending write operations.
///
/// The queue preserves enqueue order; replay walks it front to back.
/// Order is load-bearing: there is a single writer per device, and the
/// remote endpoint has no ordering of its own, so replay order must match
/// local application order for both sides to converge.
///
/// # Invariants
///
/// - Entries are in enqueue order
/// - An entry is removed only through [`WriteQueue::acknowledge_head`]
/// - The head is never skipped; a failing head ends the pass
pub struct WriteQueue {
    entries: VecDeque<PendingOperation>,
}

impl WriteQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Restores a queue from persisted entries, preserving order.
    pub fn from_entries(entries: Vec<PendingOperation>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Appends an operation to the back of the queue.
    pub fn append(&mut self, operation: PendingOperation) {
        self.entries.push_back(operation);
    }

    /// Returns the operation at the head of the queue, if any.
    pub fn head(&self) -> Option<&PendingOperation> {
        self.entries.front()
    }

    /// Removes and returns the head after remote acknowledgment.
    pub fn acknowledge_head(&mut self) -> Option<PendingOperation> {
        self.entries.pop_front()
    }

    /// Increments the attempt counter of the head operation.
    pub fn record_attempt(&mut self) {
        if let Some(head) = self.entries.front_mut() {
            head.attempts += 1;
        }
    }

    /// Returns an iterator over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingOperation> {
        self.entries.iter()
    }

    /// Returns a snapshot of all entries in order.
    pub fn snapshot(&self) -> Vec<PendingOperation> {
        self.entries.iter().cloned().collect()
    }

    /// Returns the number of pending operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no pending operations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn make_op(id: &str) -> PendingOperation {
        PendingOperation::upsert("bookings", Document::new(json!({"id": id})).unwrap())
    }

    #[test]
    fn append_preserves_order() {
        let mut queue = WriteQueue::new();
        queue.append(make_op("a"));
        queue.append(make_op("b"));
        queue.append(make_op("c"));

        let ids: Vec<_> = queue
            .iter()
            .map(|op| match &op.intent {
                crate::WriteIntent::Upsert { document } => document.id().to_string(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn acknowledge_removes_head_only() {
        let mut queue = WriteQueue::new();
        queue.append(make_op("a"));
        queue.append(make_op("b"));

        let acked = queue.acknowledge_head().unwrap();
        assert_eq!(acked.kind(), "upsert");
        assert_eq!(queue.len(), 1);

        queue.acknowledge_head().unwrap();
        assert!(queue.is_empty());
        assert!(queue.acknowledge_head().is_none());
    }

    #[test]
    fn record_attempt_bumps_head() {
        let mut queue = WriteQueue::new();
        queue.append(make_op("a"));
        queue.append(make_op("b"));

        queue.record_attempt();
        queue.record_attempt();

        assert_eq!(queue.head().unwrap().attempts, 2);
        queue.acknowledge_head();
        assert_eq!(queue.head().unwrap().attempts, 0);
    }

    #[test]
    fn record_attempt_on_empty_queue() {
        let mut queue = WriteQueue::new();
        queue.record_attempt();
        assert!(queue.is_empty());
    }

    #[test]
    fn restore_from_entries() {
        let ops = vec![make_op("a"), make_op("b")];
        let queue = WriteQueue::from_entries(ops.clone());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.snapshot(), ops);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn replay_order_matches_enqueue_order(ids in proptest::collection::vec("[a-z]{1,8}", 1..20)) {
                let mut queue = WriteQueue::new();
                for id in &ids {
                    queue.append(make_op(id));
                }

                let mut drained = Vec::new();
                while let Some(op) = queue.acknowledge_head() {
                    if let crate::WriteIntent::Upsert { document } = &op.intent {
                        drained.push(document.id().to_string());
                    }
                }

                prop_assert_eq!(drained, ids);
            }
        }
    }
}
