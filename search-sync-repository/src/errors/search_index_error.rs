//! Search index error types.
//!
//! This module defines the errors raised by index registration, handle
//! resolution and store writes.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// An index with the same id is already registered.
    #[error("Index \"{0}\" is already registered")]
    DuplicateIndex(String),

    /// No index is registered under the name.
    #[error("Index \"{0}\" not found")]
    IndexNotFound(String),

    /// The index has no type with the name.
    #[error("Type \"{type_name}\" not found in index \"{index}\"")]
    TypeNotFound { index: String, type_name: String },

    /// Validation error (e.g., empty document id).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The store rejected a document write.
    #[error("Write error: {0}")]
    WriteError(String),

    /// The store rejected a document delete.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Two index/type pairs on one store resolve to the same collection.
    #[error("{first} and {second} would share collection \"{collection}\"")]
    CollectionConflict {
        collection: String,
        first: String,
        second: String,
    },

    /// Failed to create or drop a collection.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),
}

impl SearchIndexError {
    /// Create a duplicate index error.
    pub fn duplicate_index(name: impl Into<String>) -> Self {
        Self::DuplicateIndex(name.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(name: impl Into<String>) -> Self {
        Self::IndexNotFound(name.into())
    }

    /// Create a type not found error.
    pub fn type_not_found(index: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            index: index.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a collection conflict error.
    pub fn collection_conflict(
        collection: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::CollectionConflict {
            collection: collection.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }
}
