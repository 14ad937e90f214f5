//! Inspect command: collections, counts, and sync status.

use satchel_core::SyncContext;

/// Runs the inspect command.
pub fn run(context: &SyncContext) -> Result<(), Box<dyn std::error::Error>> {
    let state = context.status();

    println!("Satchel Store");
    println!("=============");
    println!("Status:   {}", state.status);
    println!("Pending:  {}", state.pending_count);
    println!();

    let mut names = context.collection_names()?;
    names.sort();

    if names.is_empty() {
        println!("No collections stored.");
        return Ok(());
    }

    println!("Collections:");
    for name in names {
        let count = context.raw_documents(&name).len();
        println!("  {name:<24} {count} document(s)");
    }

    Ok(())
}
