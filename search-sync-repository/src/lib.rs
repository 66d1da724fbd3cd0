//! # Search Sync Repository
//!
//! This crate provides the search-store side of synchronization: the
//! [`SearchStore`] capability, the [`Index`]/[`Type`] handles that write
//! through it, the process-wide [`IndexManager`] registry, and concrete
//! store implementations for OpenSearch and for in-process use.

pub mod errors;
pub mod index;
pub mod interfaces;
pub mod memory;
pub mod opensearch;

pub use errors::SearchIndexError;
pub use index::{Index, IndexManager, Type};
pub use interfaces::SearchStore;
pub use memory::MemoryStore;
pub use opensearch::OpenSearchStore;
