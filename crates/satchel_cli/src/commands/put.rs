//! Put command: upsert a JSON document into a collection.

use satchel_core::{Document, Ops, SyncContext};

/// Runs the put command.
pub fn run(
    context: &SyncContext,
    collection: &str,
    record: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = serde_json::from_str(record)?;
    let document = Document::new(value)?;
    let id = document.id().to_string();

    let ops: Ops<Document> = context.ops(collection);
    ops.persist(&document);

    let state = context.status();
    println!(
        "Stored {id:?} in {collection:?} (status: {}, pending: {})",
        state.status, state.pending_count
    );

    Ok(())
}
