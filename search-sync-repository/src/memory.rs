//! In-process search store.
//!
//! Keeps documents in memory with the same id-overwrite and
//! missing-delete semantics as a real search engine. Used by tests and by
//! embedders that want to run the pipeline without a cluster.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchStore;
use search_sync_shared::Document;

type DocumentKey = (String, String, String);
type CollectionKey = (String, String);

/// In-memory implementation of [`SearchStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<DocumentKey, Map<String, Value>>>,
    collections: Mutex<BTreeMap<CollectionKey, Value>>,
    write_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents stored for an index/type, ordered by id.
    pub async fn documents(&self, index_name: &str, type_name: &str) -> Vec<Document> {
        self.documents
            .lock()
            .await
            .iter()
            .filter(|((index, doc_type, _), _)| index == index_name && doc_type == type_name)
            .map(|((index, doc_type, id), body)| {
                Document::new(id, body.clone()).located_at(index.as_str(), doc_type.as_str())
            })
            .collect()
    }

    /// Look up a single stored document.
    pub async fn get(&self, index_name: &str, type_name: &str, id: &str) -> Option<Document> {
        let key = (index_name.to_string(), type_name.to_string(), id.to_string());
        self.documents
            .lock()
            .await
            .get(&key)
            .map(|body| Document::new(id, body.clone()).located_at(index_name, type_name))
    }

    /// Total number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.lock().await.is_empty()
    }

    /// Creation body of a collection, if it exists.
    pub async fn collection(&self, index_name: &str, type_name: &str) -> Option<Value> {
        let key = (index_name.to_string(), type_name.to_string());
        self.collections.lock().await.get(&key).cloned()
    }

    /// Number of put/delete calls that reached the store.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn key(document: &Document) -> DocumentKey {
        (
            document.index_name.clone(),
            document.type_name.clone(),
            document.id.clone(),
        )
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn put_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.documents.lock().await;
        for document in documents {
            stored.insert(Self::key(document), document.body.clone());
        }
        Ok(())
    }

    async fn delete_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.documents.lock().await;
        for document in documents {
            stored.remove(&Self::key(document));
        }
        Ok(())
    }

    async fn create_type(
        &self,
        index_name: &str,
        type_name: &str,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        let key = (index_name.to_string(), type_name.to_string());
        let mut collections = self.collections.lock().await;
        if collections.contains_key(&key) {
            return Err(SearchIndexError::index_creation(format!(
                "{}/{} already exists",
                index_name, type_name
            )));
        }
        collections.insert(key, body.clone());
        Ok(())
    }

    async fn delete_type(&self, index_name: &str, type_name: &str) -> Result<(), SearchIndexError> {
        let key = (index_name.to_string(), type_name.to_string());
        self.collections.lock().await.remove(&key);
        self.documents
            .lock()
            .await
            .retain(|(index, doc_type, _), _| !(index == index_name && doc_type == type_name));
        Ok(())
    }
}
