//! Per-event sync gates.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Decides whether a lifecycle event is mirrored into the search store.
///
/// Each event kind of a synchronizer has its own policy; a policy can be a
/// plain switch or a predicate over the entity instance.
#[derive(Clone, Default)]
pub enum SyncPolicy {
    #[default]
    Always,
    Never,
    When(Predicate),
}

impl SyncPolicy {
    /// Gate on a predicate over entities of type `E`.
    ///
    /// Entities of any other type never pass.
    pub fn when<E, F>(predicate: F) -> Self
    where
        E: Any,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::When(Arc::new(move |entity: &dyn Any| {
            entity.downcast_ref::<E>().is_some_and(|entity| predicate(entity))
        }))
    }

    /// Evaluate the gate for an entity.
    pub fn allows(&self, entity: &dyn Any) -> bool {
        match self {
            SyncPolicy::Always => true,
            SyncPolicy::Never => false,
            SyncPolicy::When(predicate) => predicate(entity),
        }
    }
}

impl From<bool> for SyncPolicy {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Always
        } else {
            Self::Never
        }
    }
}

impl fmt::Debug for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPolicy::Always => f.write_str("Always"),
            SyncPolicy::Never => f.write_str("Never"),
            SyncPolicy::When(_) => f.write_str("When(..)"),
        }
    }
}
