//! Collection cache store.

use crate::backend::{share, KeyValueBackend, SharedBackend};
use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use satchel_protocol::Document;
use std::collections::HashMap;
use tracing::warn;

const COLLECTION_PREFIX: &str = "collection.";

/// A durable map from collection name to its document array.
///
/// The in-memory map is authoritative for the session: every mutation is
/// applied in memory first and then persisted through the backend. When
/// persistence fails (quota, I/O, serialization) the error is returned to
/// the caller but the in-memory change is kept, so readers keep seeing
/// their own writes while the backend is degraded.
///
/// Collections load lazily from the backend on first access and are
/// memoized for the rest of the session.
pub struct CacheStore {
    backend: SharedBackend,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl CacheStore {
    /// Creates a cache store owning the given backend.
    pub fn open(backend: Box<dyn KeyValueBackend>) -> Self {
        Self::from_shared(share(backend))
    }

    /// Creates a cache store over an already-shared backend.
    pub fn from_shared(backend: SharedBackend) -> Self {
        Self {
            backend,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a handle to the underlying backend.
    pub fn backend(&self) -> SharedBackend {
        SharedBackend::clone(&self.backend)
    }

    /// Returns the documents of a collection, empty if never cached.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let mut collections = self.collections.write();
        self.entry(&mut collections, collection).clone()
    }

    /// Replaces the whole collection with the given documents.
    ///
    /// Duplicate ids in the input are folded with upsert semantics, so
    /// the later occurrence wins and every stored id stays unique.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the in-memory replacement
    /// is kept either way.
    pub fn replace(&self, collection: &str, documents: Vec<Document>) -> StoreResult<()> {
        let mut folded: Vec<Document> = Vec::with_capacity(documents.len());
        for document in documents {
            upsert_by_id(&mut folded, document);
        }

        let snapshot = {
            let mut collections = self.collections.write();
            collections.insert(collection.to_string(), folded.clone());
            folded
        };
        self.persist(collection, &snapshot)
    }

    /// Inserts or replaces one document by id, preserving order otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the in-memory upsert is
    /// kept either way.
    pub fn upsert(&self, collection: &str, document: Document) -> StoreResult<()> {
        let snapshot = {
            let mut collections = self.collections.write();
            let docs = self.entry(&mut collections, collection);
            upsert_by_id(docs, document);
            docs.clone()
        };
        self.persist(collection, &snapshot)
    }

    /// Removes one document by id.
    ///
    /// Returns whether a document was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the in-memory removal is
    /// kept either way.
    pub fn remove(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let (snapshot, removed) = {
            let mut collections = self.collections.write();
            let docs = self.entry(&mut collections, collection);
            let before = docs.len();
            docs.retain(|doc| doc.id() != id);
            (docs.clone(), docs.len() != before)
        };
        self.persist(collection, &snapshot)?;
        Ok(removed)
    }

    /// Returns the names of all collections the backend has ever stored.
    pub fn collection_names(&self) -> StoreResult<Vec<String>> {
        let keys = self.backend.lock().keys()?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(COLLECTION_PREFIX).map(str::to_string))
            .collect())
    }

    /// Loads the collection into the map if absent, returning its slot.
    fn entry<'a>(
        &self,
        collections: &'a mut HashMap<String, Vec<Document>>,
        collection: &str,
    ) -> &'a mut Vec<Document> {
        collections
            .entry(collection.to_string())
            .or_insert_with(|| self.load(collection))
    }

    fn load(&self, collection: &str) -> Vec<Document> {
        let key = collection_key(collection);
        let raw = match self.backend.lock().get(&key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(collection, error = %e, "failed to read cached collection");
                return Vec::new();
            }
        };

        match raw {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(collection, error = %e, "discarding corrupt cached collection");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    fn persist(&self, collection: &str, documents: &[Document]) -> StoreResult<()> {
        let key = collection_key(collection);
        let raw = serde_json::to_string(documents)
            .map_err(|e| StoreError::serialization(&key, e))?;
        self.backend.lock().set(&key, &raw)
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("collections", &self.collections.read().len())
            .finish_non_exhaustive()
    }
}

/// Replaces the document matching `document.id()` in place, or appends.
///
/// Existing order is preserved; an upsert of a known id keeps its slot.
pub fn upsert_by_id(documents: &mut Vec<Document>, document: Document) {
    match documents.iter_mut().find(|d| d.id() == document.id()) {
        Some(slot) => *slot = document,
        None => documents.push(document),
    }
}

fn collection_key(collection: &str) -> String {
    format!("{COLLECTION_PREFIX}{collection}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use serde_json::json;

    fn doc(id: &str, name: &str) -> Document {
        Document::new(json!({"id": id, "name": name})).unwrap()
    }

    fn store() -> CacheStore {
        CacheStore::open(Box::new(InMemoryBackend::new()))
    }

    #[test]
    fn never_cached_collection_is_empty() {
        assert!(store().documents("bookings").is_empty());
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let store = store();

        store.upsert("bookings", doc("b1", "A")).unwrap();
        store.upsert("bookings", doc("b2", "B")).unwrap();
        store.upsert("bookings", doc("b1", "A2")).unwrap();

        let docs = store.documents("bookings");
        assert_eq!(docs.len(), 2);
        // b1 keeps its original slot with the new payload.
        assert_eq!(docs[0].id(), "b1");
        assert_eq!(docs[0].value()["name"], "A2");
        assert_eq!(docs[1].id(), "b2");
    }

    #[test]
    fn replace_folds_duplicate_ids() {
        let store = store();

        store
            .replace("bookings", vec![doc("b1", "A"), doc("b2", "B"), doc("b1", "A2")])
            .unwrap();

        let docs = store.documents("bookings");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].value()["name"], "A2");
    }

    #[test]
    fn remove_by_id() {
        let store = store();
        store.replace("bookings", vec![doc("b1", "A"), doc("b2", "B")]).unwrap();

        assert!(store.remove("bookings", "b1").unwrap());
        assert!(!store.remove("bookings", "b1").unwrap());

        let docs = store.documents("bookings");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "b2");
    }

    #[test]
    fn collections_are_independent() {
        let store = store();
        store.upsert("bookings", doc("x", "A")).unwrap();
        store.upsert("patients", doc("x", "B")).unwrap();

        assert_eq!(store.documents("bookings")[0].value()["name"], "A");
        assert_eq!(store.documents("patients")[0].value()["name"], "B");
    }

    #[test]
    fn survives_reload_through_shared_backend() {
        let backend = share(Box::new(InMemoryBackend::new()));

        {
            let store = CacheStore::from_shared(SharedBackend::clone(&backend));
            store.upsert("bookings", doc("b1", "A")).unwrap();
        }

        let reloaded = CacheStore::from_shared(backend);
        let docs = reloaded.documents("bookings");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "b1");
    }

    #[test]
    fn memory_stays_authoritative_on_quota_failure() {
        let store = CacheStore::open(Box::new(InMemoryBackend::with_quota(40)));

        // Small enough to persist.
        store.upsert("b", doc("1", "a")).unwrap();

        // Too large for the remaining quota, but kept in memory.
        let err = store
            .upsert("b", doc("2", &"x".repeat(100)))
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));

        let docs = store.documents("b");
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn corrupt_persisted_payload_degrades_to_empty() {
        let mut backend = InMemoryBackend::new();
        backend.set("collection.bookings", "not json").unwrap();

        let store = CacheStore::open(Box::new(backend));
        assert!(store.documents("bookings").is_empty());
    }

    #[test]
    fn collection_names_strip_prefix() {
        let store = store();
        store.upsert("bookings", doc("b1", "A")).unwrap();
        store.upsert("audit_log", doc("e1", "B")).unwrap();

        let names = store.collection_names().unwrap();
        assert_eq!(names, vec!["audit_log", "bookings"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn last_write_wins_per_id(
                writes in proptest::collection::vec(("[a-d]", "[a-z]{1,6}"), 1..30)
            ) {
                let store = store();
                for (id, name) in &writes {
                    store.upsert("c", doc(id, name)).unwrap();
                }

                let docs = store.documents("c");

                // Every id appears exactly once.
                let mut ids: Vec<_> = docs.iter().map(|d| d.id().to_string()).collect();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), docs.len());

                // Each stored payload is the last one written for that id.
                for document in &docs {
                    let last = writes
                        .iter()
                        .rev()
                        .find(|(id, _)| id.as_str() == document.id())
                        .unwrap();
                    prop_assert_eq!(document.value()["name"].as_str().unwrap(), last.1.as_str());
                }
            }
        }
    }
}
