//! Error types for the search sync pipeline.

use search_sync_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while synchronizing or populating.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from index resolution or the search store.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// No transformer can turn the entity into documents for the destination.
    #[error("No transformer registered for {entity} in {index}/{type_name}")]
    NoTransformerRegistered {
        entity: String,
        index: String,
        type_name: String,
    },

    /// A transformer failed.
    #[error("Failed to transform {entity} for {index}/{type_name}: {message}")]
    TransformError {
        entity: String,
        index: String,
        type_name: String,
        message: String,
    },

    /// The record source failed to count or page.
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// Populate was called with a batch size of zero.
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,
}

impl PipelineError {
    /// Create a no-transformer error.
    pub fn no_transformer(
        entity: impl Into<String>,
        index: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::NoTransformerRegistered {
            entity: entity.into(),
            index: index.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a transform error.
    pub fn transform(
        entity: impl Into<String>,
        index: impl Into<String>,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::TransformError {
            entity: entity.into(),
            index: index.into(),
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchError(msg.into())
    }
}
