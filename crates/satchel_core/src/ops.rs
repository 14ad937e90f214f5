//! The uniform per-collection operations facade.

use crate::engine::SyncEngine;
use satchel_protocol::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

/// A record that can live in a collection.
///
/// `Document` implements this itself, so untyped collections work
/// through `Ops<Document>`; feature modules usually implement it on
/// their own structs for compile-time-checked field access.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Stable identifier, unique within the record's collection.
    fn id(&self) -> &str;
}

impl Record for Document {
    fn id(&self) -> &str {
        Document::id(self)
    }
}

/// Per-collection operations with identical semantics everywhere.
///
/// One `Ops` instance serves one collection. Every feature module gets
/// the same four operations with the same contracts; none of them ever
/// fails to the caller - trouble is visible only through the status
/// snapshot.
///
/// # Example
///
/// ```rust,ignore
/// let bookings: Ops<Booking> = context.ops("bookings");
///
/// bookings.persist(&booking);        // optimistic, queued remotely
/// let all = bookings.load();         // cached + reconciled
/// bookings.delete(&booking.id);
/// ```
pub struct Ops<T: Record> {
    collection: String,
    engine: Arc<SyncEngine>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> Ops<T> {
    pub(crate) fn new(collection: String, engine: Arc<SyncEngine>) -> Self {
        Self {
            collection,
            engine,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name this facade serves.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns usable records, reconciling with the remote when it
    /// answers. Offline callers get cached data; a collection that was
    /// never written is empty.
    pub fn load(&self) -> Vec<T> {
        self.decode(self.engine.load_collection(&self.collection))
    }

    /// Returns cached records without touching the network.
    pub fn cached(&self) -> Vec<T> {
        self.decode(self.engine.cached_documents(&self.collection))
    }

    /// Upserts one record locally and queues the remote upsert.
    ///
    /// Returns immediately; the caller never sees a failure.
    pub fn persist(&self, record: &T) {
        match Document::from_record(record) {
            Ok(document) => self.engine.persist_document(&self.collection, document),
            Err(e) => self.engine.note_local_failure(&self.collection, &e.into()),
        }
    }

    /// Replaces the whole collection locally and queues the remote
    /// replace. Used for bulk import and reorder.
    ///
    /// The replace is atomic: if any record fails to encode, nothing
    /// is applied.
    pub fn persist_all(&self, records: &[T]) {
        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            match Document::from_record(record) {
                Ok(document) => documents.push(document),
                Err(e) => {
                    self.engine.note_local_failure(&self.collection, &e.into());
                    return;
                }
            }
        }

        self.engine
            .persist_all_documents(&self.collection, documents);
    }

    /// Removes one record locally and queues the remote delete intent.
    pub fn delete(&self, id: &str) {
        self.engine.delete_document(&self.collection, id);
    }

    fn decode(&self, documents: Vec<Document>) -> Vec<T> {
        documents
            .iter()
            .filter_map(|document| match document.to_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        collection = %self.collection,
                        id = document.id(),
                        error = %e,
                        "skipping record that does not match the expected shape"
                    );
                    None
                }
            })
            .collect()
    }
}

impl<T: Record> Clone for Ops<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            engine: Arc::clone(&self.engine),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> std::fmt::Debug for Ops<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ops")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}
