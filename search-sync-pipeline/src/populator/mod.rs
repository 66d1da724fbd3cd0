//! Populator module for the search sync pipeline.
//!
//! Backfills a type from a paged record source.

mod fetcher;
mod progress;
mod type_populator;

pub use fetcher::{PopulationFetcher, VecFetcher};
pub use progress::{NoProgress, ProgressSink};
pub use type_populator::Populator;
