//! Connectivity tracking.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether the remote endpoint is currently believed reachable.
///
/// The host feeds connectivity signal transitions in through
/// [`Reachability::set_online`]; actual call outcomes correct the belief
/// through [`Reachability::note_outcome`]. When no signal source exists
/// the monitor stays online-optimistic, so the first real call decides.
#[derive(Debug)]
pub struct Reachability {
    online: AtomicBool,
}

impl Reachability {
    /// Creates a monitor with the online-optimistic default.
    pub fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    /// Returns the current belief.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Records a connectivity signal transition from the host.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Corrects the belief from an actual call outcome.
    pub fn note_outcome(&self, reachable: bool) {
        self.online.store(reachable, Ordering::SeqCst);
    }
}

impl Default for Reachability {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_optimistic_default() {
        assert!(Reachability::new().is_online());
    }

    #[test]
    fn signal_transitions() {
        let reachability = Reachability::new();

        reachability.set_online(false);
        assert!(!reachability.is_online());

        reachability.set_online(true);
        assert!(reachability.is_online());
    }

    #[test]
    fn outcomes_correct_the_signal() {
        let reachability = Reachability::new();

        // Signal says online, but calls keep failing.
        reachability.note_outcome(false);
        assert!(!reachability.is_online());

        // A successful call restores the belief.
        reachability.note_outcome(true);
        assert!(reachability.is_online());
    }
}
