//! Synchronizer module for the search sync pipeline.
//!
//! Mirrors single-record lifecycle events into document writes and deletes.

mod entity_synchronizer;
mod listener;
mod policy;

pub use entity_synchronizer::{SyncOutcome, Synchronizer};
pub use listener::LifecycleListener;
pub use policy::SyncPolicy;
