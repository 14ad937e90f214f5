//! Pending command: list the write queue.

use satchel_core::SyncContext;

/// Runs the pending command.
pub fn run(context: &SyncContext, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pending = context.pending();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }

    println!("{} pending operation(s), replay order:", pending.len());
    for (index, operation) in pending.iter().enumerate() {
        println!(
            "  {:>3}. {:<12} {:<20} attempts={} op_id={}",
            index + 1,
            operation.kind(),
            operation.collection,
            operation.attempts,
            operation.op_id,
        );
    }

    Ok(())
}
