//! Type handle: the write/delete surface for one index/type collection.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchStore;
use search_sync_shared::Document;

/// A named collection inside an [`Index`](crate::Index).
///
/// Types are vended by their index and carry no state beyond their identity
/// and the index's store client.
pub struct Type {
    name: String,
    index_id: String,
    client: Arc<dyn SearchStore>,
}

impl Type {
    pub(crate) fn new(
        name: impl Into<String>,
        index_id: impl Into<String>,
        client: Arc<dyn SearchStore>,
    ) -> Self {
        Self {
            name: name.into(),
            index_id: index_id.into(),
            client,
        }
    }

    /// Name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the owning index.
    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    /// Write documents into this type in one bulk call.
    ///
    /// An empty slice is a no-op and never reaches the store.
    #[instrument(skip(self, documents), fields(index = %self.index_id, type_name = %self.name, count = documents.len()))]
    pub async fn put_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        if documents.is_empty() {
            return Ok(());
        }

        self.validate(documents)?;
        self.client.put_documents(documents).await?;

        debug!("Documents written");
        Ok(())
    }

    /// Delete documents from this type in one bulk call.
    ///
    /// Deleting ids that were never written (or already deleted) succeeds.
    #[instrument(skip(self, documents), fields(index = %self.index_id, type_name = %self.name, count = documents.len()))]
    pub async fn delete_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        if documents.is_empty() {
            return Ok(());
        }

        self.validate(documents)?;
        self.client.delete_documents(documents).await?;

        debug!("Documents deleted");
        Ok(())
    }

    /// Write a single document.
    pub async fn put_document(&self, document: &Document) -> Result<(), SearchIndexError> {
        self.put_documents(std::slice::from_ref(document)).await
    }

    /// Delete a single document.
    pub async fn delete_document(&self, document: &Document) -> Result<(), SearchIndexError> {
        self.delete_documents(std::slice::from_ref(document)).await
    }

    fn validate(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        for document in documents {
            if !document.has_id() {
                return Err(SearchIndexError::validation(format!(
                    "document for {}/{} has an empty id",
                    self.index_id, self.name
                )));
            }
            if !document.is_located_at(&self.index_id, &self.name) {
                return Err(SearchIndexError::validation(format!(
                    "document {} targets {}/{} but was sent to {}/{}",
                    document.id,
                    document.index_name,
                    document.type_name,
                    self.index_id,
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.name)
            .field("index_id", &self.index_id)
            .finish_non_exhaustive()
    }
}
