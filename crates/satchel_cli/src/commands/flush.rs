//! Flush command: attempt to drain the pending queue.

use satchel_core::SyncContext;

/// Runs the flush command.
pub fn run(context: &SyncContext) {
    let before = context.pending_count();
    if before == 0 {
        println!("Queue is empty, nothing to flush.");
        return;
    }

    println!("Flushing {before} pending operation(s)...");
    context.flush();

    let state = context.status();
    let delivered = before.saturating_sub(state.pending_count);
    println!(
        "Delivered {delivered}, {} remaining, status: {}",
        state.pending_count, state.status
    );
}
