//! Search store trait definition.
//!
//! This module defines the write/delete capability that `Type` handles
//! delegate to, allowing for different backend implementations (OpenSearch,
//! in-memory, mocks).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use search_sync_shared::Document;

/// Abstracts the underlying search store.
///
/// Documents carry their own index/type coordinates; implementations decide
/// how those map onto physical collections.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so handles can be shared across
/// tasks.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Write documents, overwriting any existing document with the same id.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to write, in one bulk request
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was written
    /// * `Err(SearchIndexError::WriteError)` - If the store rejected any of them
    async fn put_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError>;

    /// Delete documents by id.
    ///
    /// Documents that don't exist are considered successfully deleted.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was deleted (or didn't exist)
    /// * `Err(SearchIndexError::DeleteError)` - If the store rejected a delete
    async fn delete_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError>;

    /// Create the collection backing an index/type pair.
    ///
    /// `body` is passed through unchanged; it holds the raw index settings and
    /// the type mappings.
    async fn create_type(
        &self,
        index_name: &str,
        type_name: &str,
        body: &Value,
    ) -> Result<(), SearchIndexError>;

    /// Drop the collection backing an index/type pair.
    ///
    /// Dropping a collection that doesn't exist is not an error.
    async fn delete_type(&self, index_name: &str, type_name: &str) -> Result<(), SearchIndexError>;

    /// Name of the collection backing an index/type pair, for stores that
    /// fold the pair into a single name.
    ///
    /// Pairs resolving to the same name would share a collection. `None`
    /// means every pair is kept apart.
    fn collection_name(&self, _index_name: &str, _type_name: &str) -> Option<String> {
        None
    }
}
