//! Lifecycle events raised by the primary record store.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Runtime identity of an entity type.
///
/// Transformers and synchronizers are keyed by the class of the records they
/// handle; this is the Rust-side equivalent of "the entity's class".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityClass {
    id: TypeId,
    name: &'static str,
}

impl EntityClass {
    /// The class of `E`.
    pub fn of<E: Any>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type id of the class.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Kind of lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The record was created.
    Create,
    /// The record was updated.
    Update,
    /// The record was deleted.
    Delete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Create => f.write_str("create"),
            EventKind::Update => f.write_str("update"),
            EventKind::Delete => f.write_str("delete"),
        }
    }
}

/// A record instance together with what happened to it.
///
/// The entity is type-erased so that any dispatch mechanism (direct calls, a
/// queue, an observer list) can carry events for every entity class.
#[derive(Clone)]
pub struct LifecycleEvent {
    kind: EventKind,
    class: EntityClass,
    entity: Arc<dyn Any + Send + Sync>,
}

impl LifecycleEvent {
    /// Create an event owning `entity`.
    ///
    /// The event class is the type of `entity` as given. Passing an
    /// `Arc<Product>` yields class `Arc<Product>`, which no `Product`
    /// synchronizer handles; use [`LifecycleEvent::shared`] for entities that
    /// are already behind an `Arc`.
    pub fn new<E: Any + Send + Sync>(kind: EventKind, entity: E) -> Self {
        Self::shared(kind, Arc::new(entity))
    }

    /// Create an event for an already shared entity.
    pub fn shared<E: Any + Send + Sync>(kind: EventKind, entity: Arc<E>) -> Self {
        Self {
            kind,
            class: EntityClass::of::<E>(),
            entity,
        }
    }

    /// Shorthand for a create event.
    pub fn created<E: Any + Send + Sync>(entity: E) -> Self {
        Self::new(EventKind::Create, entity)
    }

    /// Shorthand for an update event.
    pub fn updated<E: Any + Send + Sync>(entity: E) -> Self {
        Self::new(EventKind::Update, entity)
    }

    /// Shorthand for a delete event.
    pub fn deleted<E: Any + Send + Sync>(entity: E) -> Self {
        Self::new(EventKind::Delete, entity)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn class(&self) -> EntityClass {
        self.class
    }

    /// The type-erased entity.
    pub fn entity(&self) -> &(dyn Any + Send + Sync) {
        &*self.entity
    }

    /// The entity as `E`, if it is one.
    pub fn downcast_ref<E: Any>(&self) -> Option<&E> {
        self.entity.downcast_ref::<E>()
    }
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("kind", &self.kind)
            .field("class", &self.class.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Product {
        sku: String,
    }

    struct Order;

    #[test]
    fn test_entity_class_identity() {
        assert_eq!(EntityClass::of::<Product>(), EntityClass::of::<Product>());
        assert_ne!(EntityClass::of::<Product>(), EntityClass::of::<Order>());
        assert!(EntityClass::of::<Product>().name().ends_with("Product"));
    }

    #[test]
    fn test_event_carries_runtime_class() {
        let event = LifecycleEvent::updated(Product {
            sku: "A-1".to_string(),
        });

        assert_eq!(event.kind(), EventKind::Update);
        assert_eq!(event.class(), EntityClass::of::<Product>());
        assert!(event.entity().is::<Product>());
        assert_eq!(
            event.downcast_ref::<Product>().map(|p| p.sku.as_str()),
            Some("A-1")
        );
        assert!(event.downcast_ref::<Order>().is_none());
    }

    #[test]
    fn test_shared_event() {
        let product = Arc::new(Product {
            sku: "B-2".to_string(),
        });
        let event = LifecycleEvent::shared(EventKind::Delete, product.clone());

        assert_eq!(event.kind(), EventKind::Delete);
        assert_eq!(event.downcast_ref::<Product>(), Some(&*product));
    }

    #[test]
    fn test_new_keeps_the_wrapper_class() {
        let product = Arc::new(Product {
            sku: "C-3".to_string(),
        });

        let wrapped = LifecycleEvent::new(EventKind::Create, product.clone());
        assert_eq!(wrapped.class(), EntityClass::of::<Arc<Product>>());
        assert!(wrapped.downcast_ref::<Product>().is_none());

        let shared = LifecycleEvent::shared(EventKind::Create, product);
        assert_eq!(shared.class(), EntityClass::of::<Product>());
    }
}
