//! OpenSearch implementation of the search store.
//!
//! This module provides a concrete implementation of `SearchStore` using
//! OpenSearch as the backend.

mod client;
mod index_config;

pub use client::OpenSearchStore;
pub use index_config::physical_index_name;
