//! Progress reporting for bulk population.

/// Receives progress of a populate run.
///
/// `advance` is called with the number of source records processed, not
/// the number of documents written.
pub trait ProgressSink: Send {
    fn start(&mut self, total: usize);
    fn advance(&mut self, step: usize);
    fn finish(&mut self);
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&mut self, _total: usize) {}

    fn advance(&mut self, _step: usize) {}

    fn finish(&mut self) {}
}
