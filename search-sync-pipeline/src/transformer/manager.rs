//! Transformer registry.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::errors::PipelineError;
use crate::transformer::{TransformError, Transformer};
use search_sync_shared::{Document, EntityClass};

/// Object-safe view of a [`Transformer`].
trait ErasedTransformer: Send + Sync {
    /// `None` when the entity is not of the transformer's class.
    fn transform_any(&self, entity: &dyn Any) -> Option<Result<Vec<Document>, TransformError>>;
}

impl<T: Transformer> ErasedTransformer for T {
    fn transform_any(&self, entity: &dyn Any) -> Option<Result<Vec<Document>, TransformError>> {
        entity
            .downcast_ref::<T::Entity>()
            .map(|entity| self.transform(entity))
    }
}

/// A type-erased transformer together with the entity class it declares.
///
/// Cloning shares the underlying transformer, so one instance can be
/// registered for several destinations.
#[derive(Clone)]
pub struct RegisteredTransformer {
    class: EntityClass,
    inner: Arc<dyn ErasedTransformer>,
}

impl RegisteredTransformer {
    pub fn new<T: Transformer>(transformer: T) -> Self {
        Self::shared(Arc::new(transformer))
    }

    pub fn shared<T: Transformer>(transformer: Arc<T>) -> Self {
        Self {
            class: EntityClass::of::<T::Entity>(),
            inner: transformer,
        }
    }

    /// Entity class the transformer accepts.
    pub fn class(&self) -> EntityClass {
        self.class
    }
}

impl fmt::Debug for RegisteredTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTransformer")
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}

type TransformerKey = (String, String, EntityClass);

/// Registry routing records to transformers by index, type and entity class.
///
/// Registration takes `&mut self` and happens during setup; afterwards the
/// manager is shared read-only behind an `Arc`.
#[derive(Debug, Default)]
pub struct TransformerManager {
    transformers: HashMap<TransformerKey, Vec<RegisteredTransformer>>,
}

impl TransformerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer for an index/type destination.
    ///
    /// Registrations for the same key accumulate; documents are produced in
    /// registration order.
    pub fn register_transformer<T: Transformer>(
        &mut self,
        transformer: T,
        index_name: &str,
        type_name: &str,
    ) {
        self.register(RegisteredTransformer::new(transformer), index_name, type_name);
    }

    /// Register an already erased (possibly shared) transformer.
    pub fn register(
        &mut self,
        transformer: RegisteredTransformer,
        index_name: &str,
        type_name: &str,
    ) {
        debug!(
            entity = %transformer.class(),
            index = %index_name,
            type_name = %type_name,
            "Transformer registered"
        );

        self.transformers
            .entry((index_name.to_string(), type_name.to_string(), transformer.class()))
            .or_default()
            .push(transformer);
    }

    /// Check whether any transformer handles `class` for the destination.
    pub fn has_transformer(&self, class: EntityClass, index_name: &str, type_name: &str) -> bool {
        self.lookup(class, index_name, type_name).is_some()
    }

    /// Transform a record into documents for an index/type.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Document>)` - Every registered transformer's output, in
    ///   registration order, placed at `index_name`/`type_name`
    /// * `Err(PipelineError::NoTransformerRegistered)` - If nothing is
    ///   registered for the record's class at the destination
    /// * `Err(PipelineError::TransformError)` - If a transformer failed
    pub fn transform_to_documents<E: Any>(
        &self,
        entity: &E,
        index_name: &str,
        type_name: &str,
    ) -> Result<Vec<Document>, PipelineError> {
        self.transform_erased(entity, EntityClass::of::<E>(), index_name, type_name)
    }

    /// Transform a type-erased record whose runtime class is `class`.
    #[instrument(skip(self, entity), fields(entity = %class))]
    pub fn transform_erased(
        &self,
        entity: &dyn Any,
        class: EntityClass,
        index_name: &str,
        type_name: &str,
    ) -> Result<Vec<Document>, PipelineError> {
        let transformers = self
            .lookup(class, index_name, type_name)
            .ok_or_else(|| PipelineError::no_transformer(class.name(), index_name, type_name))?;

        let mut documents = Vec::new();
        for transformer in transformers {
            let produced = transformer
                .inner
                .transform_any(entity)
                .ok_or_else(|| {
                    PipelineError::transform(
                        class.name(),
                        index_name,
                        type_name,
                        "record is not an instance of the declared class",
                    )
                })?
                .map_err(|e| {
                    PipelineError::transform(class.name(), index_name, type_name, e.to_string())
                })?;

            documents.extend(
                produced
                    .into_iter()
                    .map(|document| document.located_at(index_name, type_name)),
            );
        }

        Ok(documents)
    }

    fn lookup(
        &self,
        class: EntityClass,
        index_name: &str,
        type_name: &str,
    ) -> Option<&Vec<RegisteredTransformer>> {
        self.transformers
            .get(&(index_name.to_string(), type_name.to_string(), class))
            .filter(|transformers| !transformers.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::transformer_fn;
    use serde_json::Map;

    struct Product {
        id: u32,
        variants: Vec<&'static str>,
    }

    struct Order;

    struct ProductTransformer;

    impl Transformer for ProductTransformer {
        type Entity = Product;

        fn transform(&self, product: &Product) -> Result<Vec<Document>, TransformError> {
            Ok(vec![Document::new(product.id, Map::new()).with_field("source", "product")])
        }
    }

    fn product() -> Product {
        Product {
            id: 1,
            variants: vec!["red", "blue"],
        }
    }

    #[test]
    fn test_unregistered_key_fails() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(ProductTransformer, "shop", "product");

        let result = manager.transform_to_documents(&Order, "shop", "product");
        assert!(matches!(result, Err(PipelineError::NoTransformerRegistered { .. })));

        let result = manager.transform_to_documents(&product(), "shop", "order");
        assert!(matches!(
            result,
            Err(PipelineError::NoTransformerRegistered { ref type_name, .. }) if type_name == "order"
        ));
    }

    #[test]
    fn test_documents_are_placed_at_destination() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(ProductTransformer, "shop", "product");

        let documents = manager
            .transform_to_documents(&product(), "shop", "product")
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id, "1");
        assert!(documents[0].is_located_at("shop", "product"));
    }

    #[test]
    fn test_registration_order_is_output_order() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(ProductTransformer, "shop", "product");
        manager.register_transformer(
            transformer_fn(|product: &Product| {
                Ok(product
                    .variants
                    .iter()
                    .map(|variant| Document::new(format!("{}-{}", product.id, variant), Map::new()))
                    .collect())
            }),
            "shop",
            "product",
        );

        let documents = manager
            .transform_to_documents(&product(), "shop", "product")
            .unwrap();

        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1-red", "1-blue"]);
    }

    #[test]
    fn test_empty_output_is_not_an_error() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(transformer_fn(|_: &Product| Ok(vec![])), "shop", "product");

        let documents = manager
            .transform_to_documents(&product(), "shop", "product")
            .unwrap();
        assert!(documents.is_empty());
    }

    #[test]
    fn test_one_class_fans_out_to_several_destinations() {
        let shared = RegisteredTransformer::new(ProductTransformer);
        let mut manager = TransformerManager::new();
        manager.register(shared.clone(), "shop", "product");
        manager.register(shared, "catalog", "item");

        let class = EntityClass::of::<Product>();
        assert!(manager.has_transformer(class, "shop", "product"));
        assert!(manager.has_transformer(class, "catalog", "item"));

        let documents = manager
            .transform_to_documents(&product(), "catalog", "item")
            .unwrap();
        assert!(documents[0].is_located_at("catalog", "item"));
    }

    #[test]
    fn test_transformer_failure_carries_context() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(
            transformer_fn(|_: &Product| Err(TransformError::new("missing price"))),
            "shop",
            "product",
        );

        let result = manager.transform_to_documents(&product(), "shop", "product");
        match result {
            Err(PipelineError::TransformError {
                entity, message, ..
            }) => {
                assert!(entity.ends_with("Product"));
                assert_eq!(message, "missing price");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_erased_transform_uses_given_class() {
        let mut manager = TransformerManager::new();
        manager.register_transformer(ProductTransformer, "shop", "product");

        let entity: Box<dyn Any> = Box::new(product());
        let documents = manager
            .transform_erased(&*entity, EntityClass::of::<Product>(), "shop", "product")
            .unwrap();
        assert_eq!(documents.len(), 1);
    }
}
