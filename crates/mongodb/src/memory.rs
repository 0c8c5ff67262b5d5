//! In-process document store.

use crate::error::{Error, Result};
use crate::store::DocumentStore;
use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::collections::HashMap;
use std::sync::Mutex;

/// [`DocumentStore`] keeping every collection in memory.
///
/// Documents are returned in insertion order. Filters match on exact field
/// equality only, which is all sms-store issues.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .lock()
            .map_err(|_| Error::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn with_id(mut document: Document) -> (Bson, Document) {
    match document.get("_id") {
        Some(id) => (id.clone(), document),
        None => {
            let id = Bson::ObjectId(ObjectId::new());
            let mut with_id = Document::new();
            with_id.insert("_id", id.clone());
            with_id.extend(std::mem::take(&mut document));
            (id, with_id)
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<Bson> {
        let (id, document) = with_id(document);
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find_many(&self, collection: &str, filter: Document) -> Result<Vec<Document>> {
        Ok(self
            .lock()?
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
    ) -> Result<()> {
        let mut collections = self.lock()?;
        let documents = collections.entry(collection.to_string()).or_default();
        match documents.iter_mut().find(|d| matches(d, &filter)) {
            Some(existing) => existing.extend(fields),
            None => {
                let mut document = filter;
                document.extend(fields);
                documents.push(with_id(document).1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.insert("c", doc! { "k": 1 }).await.unwrap();
        let b = store.insert("c", doc! { "k": 1 }).await.unwrap();
        assert_ne!(a, b);
        assert!(matches!(a, Bson::ObjectId(_)));
        assert_eq!(store.len("c"), 2);
    }

    #[tokio::test]
    async fn test_find_many_filters_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        store.insert("c", doc! { "k": "a", "n": 1 }).await.unwrap();
        store.insert("c", doc! { "k": "b", "n": 2 }).await.unwrap();
        store.insert("c", doc! { "k": "a", "n": 3 }).await.unwrap();

        let found = store.find_many("c", doc! { "k": "a" }).await.unwrap();
        let ns: Vec<i32> = found.iter().map(|d| d.get_i32("n").unwrap()).collect();
        assert_eq!(ns, vec![1, 3]);

        assert!(store.find_many("missing", doc! {}).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates_in_place() {
        let store = MemoryStore::new();
        store
            .upsert_one("u", doc! { "key": "x" }, doc! { "status": "A" })
            .await
            .unwrap();
        store
            .upsert_one("u", doc! { "key": "x" }, doc! { "status": "B" })
            .await
            .unwrap();

        assert_eq!(store.len("u"), 1);
        let found = store.find_many("u", doc! { "key": "x" }).await.unwrap();
        assert_eq!(found[0].get_str("status").unwrap(), "B");
        assert!(found[0].contains_key("_id"));
    }
}
