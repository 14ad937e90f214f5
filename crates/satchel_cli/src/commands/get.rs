//! Get command: print a collection's cached documents.

use satchel_core::{Document, Ops, SyncContext};

/// Runs the get command.
pub fn run(context: &SyncContext, collection: &str) {
    let ops: Ops<Document> = context.ops(collection);
    let documents = ops.load();

    if documents.is_empty() {
        println!("Collection {collection:?} is empty.");
        return;
    }

    for document in documents {
        println!("{}", document.value());
    }
}
