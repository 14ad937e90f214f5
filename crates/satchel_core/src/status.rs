//! Sync status state machine and broadcaster.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// The current phase of the sync layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No pending operations, or the last attempt succeeded.
    Idle,
    /// A flush is in progress.
    Syncing,
    /// The connectivity signal is down, or the last failure was
    /// connectivity-classified.
    Offline,
    /// The last failure was application-classified after a pass exhausted
    /// its retries, or local persistence failed.
    Error,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Offline => "offline",
            SyncStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// The full status snapshot delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    /// The current phase.
    pub status: SyncStatus,
    /// The number of not-yet-acknowledged write operations.
    pub pending_count: usize,
}

impl SyncState {
    /// The starting snapshot: idle with nothing pending.
    pub fn idle() -> Self {
        Self {
            status: SyncStatus::Idle,
            pending_count: 0,
        }
    }
}

type Callback = Box<dyn Fn(SyncState) + Send + Sync>;

struct Shared {
    state: RwLock<SyncState>,
    subscribers: RwLock<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// The single source of truth for `{status, pending_count}`.
///
/// Subscribers get the full snapshot on every transition, synchronously
/// and without diffing - the subscriber count is a handful of UI
/// indicators, not a fan-out problem. Publishing an unchanged snapshot
/// notifies nobody, so "once per transition" holds exactly.
///
/// Callbacks run while the subscriber list is borrowed; a callback must
/// not subscribe, cancel, or publish from inside itself.
pub struct StatusBroadcaster {
    shared: Arc<Shared>,
}

impl StatusBroadcaster {
    /// Creates a broadcaster in the idle state.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(SyncState::idle()),
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn state(&self) -> SyncState {
        *self.shared.state.read()
    }

    /// Publishes a new snapshot, notifying subscribers on change.
    pub fn publish(&self, next: SyncState) {
        {
            let mut state = self.shared.state.write();
            if *state == next {
                return;
            }
            *state = next;
        }

        let subscribers = self.shared.subscribers.read();
        for (_, callback) in subscribers.iter() {
            callback(next);
        }
    }

    /// Subscribes to status transitions.
    ///
    /// The callback receives the current snapshot synchronously before
    /// this returns, then one call per transition. Dropping (or
    /// cancelling) the returned handle unsubscribes.
    pub fn subscribe(
        &self,
        callback: impl Fn(SyncState) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);

        callback(self.state());
        self.shared
            .subscribers
            .write()
            .push((id, Box::new(callback)));

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatusBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBroadcaster")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`StatusBroadcaster::subscribe`].
///
/// The subscription stays active for the lifetime of the handle.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Unsubscribes explicitly. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.subscribers.write().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collect() -> (Arc<Mutex<Vec<SyncState>>>, impl Fn(SyncState) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |state| sink.lock().push(state))
    }

    fn state(status: SyncStatus, pending_count: usize) -> SyncState {
        SyncState {
            status,
            pending_count,
        }
    }

    #[test]
    fn initial_snapshot_on_subscribe() {
        let broadcaster = StatusBroadcaster::new();
        let (seen, sink) = collect();

        let _sub = broadcaster.subscribe(sink);

        assert_eq!(seen.lock().as_slice(), &[SyncState::idle()]);
    }

    #[test]
    fn one_callback_per_transition() {
        let broadcaster = StatusBroadcaster::new();
        let (seen, sink) = collect();
        let _sub = broadcaster.subscribe(sink);

        broadcaster.publish(state(SyncStatus::Syncing, 1));
        broadcaster.publish(state(SyncStatus::Syncing, 1)); // unchanged, no fire
        broadcaster.publish(state(SyncStatus::Syncing, 2)); // count change fires
        broadcaster.publish(state(SyncStatus::Idle, 0));

        assert_eq!(
            seen.lock().as_slice(),
            &[
                SyncState::idle(),
                state(SyncStatus::Syncing, 1),
                state(SyncStatus::Syncing, 2),
                state(SyncStatus::Idle, 0),
            ]
        );
    }

    #[test]
    fn multiple_subscribers_all_notified() {
        let broadcaster = StatusBroadcaster::new();
        let (seen_a, sink_a) = collect();
        let (seen_b, sink_b) = collect();
        let _a = broadcaster.subscribe(sink_a);
        let _b = broadcaster.subscribe(sink_b);

        broadcaster.publish(state(SyncStatus::Offline, 3));

        assert_eq!(seen_a.lock().len(), 2);
        assert_eq!(seen_b.lock().len(), 2);
    }

    #[test]
    fn drop_unsubscribes() {
        let broadcaster = StatusBroadcaster::new();
        let (seen, sink) = collect();

        let sub = broadcaster.subscribe(sink);
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(sub);
        assert_eq!(broadcaster.subscriber_count(), 0);

        broadcaster.publish(state(SyncStatus::Offline, 1));
        assert_eq!(seen.lock().len(), 1); // only the initial snapshot
    }

    #[test]
    fn cancel_unsubscribes() {
        let broadcaster = StatusBroadcaster::new();
        let (_seen, sink) = collect();

        let sub = broadcaster.subscribe(sink);
        sub.cancel();

        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outliving_broadcaster_is_harmless() {
        let broadcaster = StatusBroadcaster::new();
        let (_seen, sink) = collect();
        let sub = broadcaster.subscribe(sink);

        drop(broadcaster);
        drop(sub);
    }

    #[test]
    fn status_display() {
        assert_eq!(SyncStatus::Idle.to_string(), "idle");
        assert_eq!(SyncStatus::Offline.to_string(), "offline");
    }
}
