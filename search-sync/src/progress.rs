//! Progress reporting through tracing.

use search_sync_pipeline::ProgressSink;
use tracing::info;

/// Logs populate progress as structured events.
///
/// A line is emitted roughly every ten percent, plus one at start and finish.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    total: usize,
    done: usize,
    reported_decile: usize,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            done: 0,
            reported_decile: 0,
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.done.min(self.total) * 100 / self.total
        }
    }
}

impl ProgressSink for LogProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.reported_decile = 0;
        info!(label = %self.label, total, "Population started");
    }

    fn advance(&mut self, step: usize) {
        self.done += step;

        let decile = self.percent() / 10;
        if decile > self.reported_decile {
            self.reported_decile = decile;
            info!(
                label = %self.label,
                done = self.done,
                total = self.total,
                percent = self.percent(),
                "Population progress"
            );
        }
    }

    fn finish(&mut self) {
        info!(label = %self.label, done = self.done, total = self.total, "Population finished");
    }
}
