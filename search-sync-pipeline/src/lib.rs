//! # Search Sync Pipeline
//!
//! This crate keeps search documents in step with the primary record store.
//!
//! ## Architecture
//!
//! Three components meet at the `Type` write/delete operations:
//!
//! 1. **Transformer**: Turns records into search documents, routed by
//!    index, type and entity class
//! 2. **Synchronizer**: Mirrors single record lifecycle events (incremental)
//! 3. **Populator**: Pages through a record source and writes every page (bulk)

pub mod errors;
pub mod populator;
pub mod synchronizer;
pub mod transformer;

pub use errors::PipelineError;
pub use populator::{NoProgress, PopulationFetcher, Populator, ProgressSink, VecFetcher};
pub use synchronizer::{LifecycleListener, SyncOutcome, SyncPolicy, Synchronizer};
pub use transformer::{
    transformer_fn, RegisteredTransformer, TransformError, Transformer, TransformerManager,
};
