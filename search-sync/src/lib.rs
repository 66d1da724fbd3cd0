//! # Search Sync
//!
//! Configuration and wiring for search synchronization.
//!
//! This crate turns a static configuration into registered indexes,
//! transformers and synchronizers, and hosts the command line entry point.

pub mod builder;
pub mod config;
pub mod progress;
pub mod records;

pub use builder::{SyncBuilder, SyncContext};
pub use config::{Dependencies, SyncConfig};
pub use progress::LogProgress;
pub use records::{FieldTransformer, JsonLinesFetcher, JsonRecord};

use thiserror::Error;

/// Errors that can occur during setup or command execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] search_sync_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] search_sync_repository::SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
