//! # Search Sync Shared
//!
//! Types shared by every crate of the search synchronization system: the
//! [`Document`] written to the search store and the lifecycle events that
//! drive incremental synchronization.

mod document;
mod event;

pub use document::Document;
pub use event::{EntityClass, EventKind, LifecycleEvent};
