//! Delete command: remove a document by id.

use satchel_core::{Document, Ops, SyncContext};

/// Runs the delete command.
pub fn run(context: &SyncContext, collection: &str, id: &str) {
    let ops: Ops<Document> = context.ops(collection);
    ops.delete(id);

    let state = context.status();
    println!(
        "Deleted {id:?} from {collection:?} (status: {}, pending: {})",
        state.status, state.pending_count
    );
}
