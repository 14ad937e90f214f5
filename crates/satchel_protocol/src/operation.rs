//! Pending write operations.

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The shape of a queued write.
///
/// These are the only three write shapes the sync layer supports:
/// insert-or-update by id, wholesale collection replacement, and removal
/// by id. There is deliberately no partial-update shape; the later of two
/// writes to the same id wins in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteIntent {
    /// Insert or replace a single document by id.
    Upsert {
        /// The full document to store.
        document: Document,
    },
    /// Replace the whole collection with the given documents.
    ReplaceAll {
        /// The new contents of the collection, in order.
        documents: Vec<Document>,
    },
    /// Remove a single document by id.
    Delete {
        /// The id of the document to remove.
        id: String,
    },
}

impl WriteIntent {
    /// Returns a short name for the intent kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WriteIntent::Upsert { .. } => "upsert",
            WriteIntent::ReplaceAll { .. } => "replace_all",
            WriteIntent::Delete { .. } => "delete",
        }
    }
}

/// A write that has been applied locally but not yet acknowledged remotely.
///
/// Pending operations are created at write time, persisted before the
/// write call returns, and destroyed only when the remote endpoint
/// acknowledges delivery. `attempts` counts delivery attempts across all
/// flush passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Unique operation id.
    pub op_id: Uuid,
    /// The collection this operation targets.
    pub collection: String,
    /// What to do.
    pub intent: WriteIntent,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Number of delivery attempts so far.
    pub attempts: u32,
}

impl PendingOperation {
    /// Creates a new upsert operation.
    pub fn upsert(collection: impl Into<String>, document: Document) -> Self {
        Self::new(collection, WriteIntent::Upsert { document })
    }

    /// Creates a new replace-all operation.
    pub fn replace_all(collection: impl Into<String>, documents: Vec<Document>) -> Self {
        Self::new(collection, WriteIntent::ReplaceAll { documents })
    }

    /// Creates a new delete operation.
    pub fn delete(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(collection, WriteIntent::Delete { id: id.into() })
    }

    fn new(collection: impl Into<String>, intent: WriteIntent) -> Self {
        Self {
            op_id: Uuid::new_v4(),
            collection: collection.into(),
            intent,
            created_at: now_millis(),
            attempts: 0,
        }
    }

    /// Returns a short name for the intent kind.
    pub fn kind(&self) -> &'static str {
        self.intent.kind()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
