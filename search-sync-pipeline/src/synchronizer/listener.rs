//! Fan-out of lifecycle events to synchronizers.

use std::sync::Arc;
use tracing::{error, instrument};

use crate::errors::PipelineError;
use crate::synchronizer::{SyncOutcome, Synchronizer};
use search_sync_shared::LifecycleEvent;

/// Delivers each lifecycle event to every synchronizer bound to the event's
/// entity class.
///
/// One entity class can be mirrored into several types, so a single event may
/// reach several synchronizers. They run one after another in registration
/// order; the first failure is returned.
#[derive(Debug, Default)]
pub struct LifecycleListener {
    synchronizers: Vec<Arc<Synchronizer>>,
}

impl LifecycleListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_synchronizer(&mut self, synchronizer: Synchronizer) {
        self.synchronizers.push(Arc::new(synchronizer));
    }

    pub fn synchronizers(&self) -> &[Arc<Synchronizer>] {
        &self.synchronizers
    }

    /// Dispatch an event.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SyncOutcome>)` - One outcome per synchronizer bound to the
    ///   event's class; empty when nothing listens for it
    /// * `Err(PipelineError)` - The first synchronizer failure
    #[instrument(skip(self, event), fields(kind = %event.kind(), entity = %event.class()))]
    pub async fn on_event(&self, event: &LifecycleEvent) -> Result<Vec<SyncOutcome>, PipelineError> {
        let mut outcomes = Vec::new();

        for synchronizer in self
            .synchronizers
            .iter()
            .filter(|synchronizer| synchronizer.handles(event.class()))
        {
            match synchronizer.handle(event).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(
                        index = %synchronizer.doc_type().index_id(),
                        type_name = %synchronizer.doc_type().name(),
                        error = %e,
                        "Synchronization failed"
                    );
                    return Err(e);
                }
            }
        }

        Ok(outcomes)
    }
}
