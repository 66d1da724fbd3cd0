//! Entity synchronizer implementation.
//!
//! Reacts to lifecycle events of one entity class by writing or deleting its
//! documents in one type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::synchronizer::SyncPolicy;
use crate::transformer::TransformerManager;
use search_sync_repository::Type;
use search_sync_shared::{EntityClass, EventKind, LifecycleEvent};

/// What a synchronizer did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The event is for another entity class.
    Ignored,
    /// The policy for the event kind did not pass.
    Skipped,
    /// Documents were put into the type.
    Written(usize),
    /// Documents were deleted from the type.
    Deleted(usize),
}

/// Mirrors lifecycle events of one entity class into one type.
///
/// The synchronizer keeps no state between events. Document ids for deletes
/// are recomputed by transforming the entity, never stored. Store failures
/// propagate unchanged; retrying is up to whoever delivers the events.
pub struct Synchronizer {
    entity_class: EntityClass,
    doc_type: Arc<Type>,
    on_create: SyncPolicy,
    on_update: SyncPolicy,
    on_delete: SyncPolicy,
    transformers: Arc<TransformerManager>,
}

impl Synchronizer {
    /// Create a synchronizer that mirrors every event kind.
    pub fn new(
        entity_class: EntityClass,
        doc_type: Arc<Type>,
        transformers: Arc<TransformerManager>,
    ) -> Self {
        Self {
            entity_class,
            doc_type,
            on_create: SyncPolicy::Always,
            on_update: SyncPolicy::Always,
            on_delete: SyncPolicy::Always,
            transformers,
        }
    }

    /// Create a synchronizer for entities of type `E`.
    pub fn for_entity<E: Any>(doc_type: Arc<Type>, transformers: Arc<TransformerManager>) -> Self {
        Self::new(EntityClass::of::<E>(), doc_type, transformers)
    }

    pub fn on_create(mut self, policy: impl Into<SyncPolicy>) -> Self {
        self.on_create = policy.into();
        self
    }

    pub fn on_update(mut self, policy: impl Into<SyncPolicy>) -> Self {
        self.on_update = policy.into();
        self
    }

    pub fn on_delete(mut self, policy: impl Into<SyncPolicy>) -> Self {
        self.on_delete = policy.into();
        self
    }

    pub fn entity_class(&self) -> EntityClass {
        self.entity_class
    }

    pub fn doc_type(&self) -> &Arc<Type> {
        &self.doc_type
    }

    /// Check whether events of `class` are handled here.
    pub fn handles(&self, class: EntityClass) -> bool {
        self.entity_class == class
    }

    /// React to a lifecycle event.
    pub async fn handle(&self, event: &LifecycleEvent) -> Result<SyncOutcome, PipelineError> {
        self.react(event.kind(), event.class(), event.entity()).await
    }

    /// Mirror the creation of `entity`.
    pub async fn synchronize_create<E: Any + Send + Sync>(
        &self,
        entity: &E,
    ) -> Result<SyncOutcome, PipelineError> {
        self.react(EventKind::Create, EntityClass::of::<E>(), entity)
            .await
    }

    /// Mirror an update of `entity`.
    pub async fn synchronize_update<E: Any + Send + Sync>(
        &self,
        entity: &E,
    ) -> Result<SyncOutcome, PipelineError> {
        self.react(EventKind::Update, EntityClass::of::<E>(), entity)
            .await
    }

    /// Mirror the deletion of `entity`.
    pub async fn synchronize_delete<E: Any + Send + Sync>(
        &self,
        entity: &E,
    ) -> Result<SyncOutcome, PipelineError> {
        self.react(EventKind::Delete, EntityClass::of::<E>(), entity)
            .await
    }

    #[instrument(
        skip(self, entity),
        fields(
            entity = %class,
            index = %self.doc_type.index_id(),
            type_name = %self.doc_type.name()
        )
    )]
    async fn react(
        &self,
        kind: EventKind,
        class: EntityClass,
        entity: &(dyn Any + Send + Sync),
    ) -> Result<SyncOutcome, PipelineError> {
        if !self.handles(class) {
            debug!(event_class = %class, expected = %self.entity_class, "Entity class mismatch, ignoring");
            return Ok(SyncOutcome::Ignored);
        }

        let policy = match kind {
            EventKind::Create => &self.on_create,
            EventKind::Update => &self.on_update,
            EventKind::Delete => &self.on_delete,
        };
        if !policy.allows(entity) {
            debug!("Sync policy closed, skipping");
            return Ok(SyncOutcome::Skipped);
        }

        let documents = self.transformers.transform_erased(
            entity,
            class,
            self.doc_type.index_id(),
            self.doc_type.name(),
        )?;

        let count = documents.len();
        match kind {
            EventKind::Create | EventKind::Update => {
                self.doc_type.put_documents(&documents).await?;
                debug!(count, "Documents synchronized");
                Ok(SyncOutcome::Written(count))
            }
            EventKind::Delete => {
                self.doc_type.delete_documents(&documents).await?;
                debug!(count, "Documents removed");
                Ok(SyncOutcome::Deleted(count))
            }
        }
    }
}

impl fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("entity_class", &self.entity_class.name())
            .field("doc_type", &self.doc_type)
            .field("on_create", &self.on_create)
            .field("on_update", &self.on_update)
            .field("on_delete", &self.on_delete)
            .finish_non_exhaustive()
    }
}
