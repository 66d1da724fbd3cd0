//! Index handle.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{info, instrument};

use crate::errors::SearchIndexError;
use crate::index::Type;
use crate::interfaces::SearchStore;

/// Per-type settings plus the lazily built handle.
struct TypeSlot {
    settings: Value,
    handle: OnceLock<Arc<Type>>,
}

/// A logical index: a named group of types sharing a store client and raw
/// index settings.
///
/// Settings and type mappings are opaque here; they are only passed through
/// to the store when collections are (re)created.
pub struct Index {
    id: String,
    client: Arc<dyn SearchStore>,
    settings: Value,
    types: BTreeMap<String, TypeSlot>,
}

impl Index {
    /// Create an index handle.
    ///
    /// # Arguments
    ///
    /// * `id` - Logical index name, unique within an `IndexManager`
    /// * `client` - Store the index's types write through
    /// * `settings` - Raw index settings
    /// * `types` - Type name to type-level settings (`{}` or `{"mappings": ...}`)
    pub fn new(
        id: impl Into<String>,
        client: Arc<dyn SearchStore>,
        settings: Value,
        types: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        let types = types
            .into_iter()
            .map(|(name, settings)| {
                (
                    name,
                    TypeSlot {
                        settings,
                        handle: OnceLock::new(),
                    },
                )
            })
            .collect();

        Self {
            id: id.into(),
            client,
            settings,
            types,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Store the index's types write through.
    pub fn client(&self) -> &Arc<dyn SearchStore> {
        &self.client
    }

    /// Raw index settings.
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// Names of the configured types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Type-level settings for `name`.
    pub fn type_settings(&self, name: &str) -> Result<&Value, SearchIndexError> {
        self.slot(name).map(|slot| &slot.settings)
    }

    /// Resolve a type handle by name.
    ///
    /// The handle is built on first access and the same handle is returned
    /// afterwards.
    pub fn get_type(&self, name: &str) -> Result<Arc<Type>, SearchIndexError> {
        let slot = self.slot(name)?;
        let handle = slot
            .handle
            .get_or_init(|| Arc::new(Type::new(name, self.id.clone(), self.client.clone())));
        Ok(handle.clone())
    }

    /// Body sent to the store when creating the collection for `type_name`:
    /// the raw index settings merged with the type-level settings.
    pub fn create_body(&self, type_name: &str) -> Result<Value, SearchIndexError> {
        let slot = self.slot(type_name)?;
        let mut body = Map::new();

        if !is_empty(&self.settings) {
            body.insert("settings".to_string(), self.settings.clone());
        }
        if let Value::Object(type_settings) = &slot.settings {
            for (key, value) in type_settings {
                body.insert(key.clone(), value.clone());
            }
        }

        Ok(Value::Object(body))
    }

    /// Create the collections of every type.
    #[instrument(skip(self), fields(index = %self.id))]
    pub async fn create(&self) -> Result<(), SearchIndexError> {
        for type_name in self.types.keys() {
            let body = self.create_body(type_name)?;
            self.client.create_type(&self.id, type_name, &body).await?;
        }
        info!(types = self.types.len(), "Index created");
        Ok(())
    }

    /// Drop the collections of every type.
    #[instrument(skip(self), fields(index = %self.id))]
    pub async fn delete(&self) -> Result<(), SearchIndexError> {
        for type_name in self.types.keys() {
            self.client.delete_type(&self.id, type_name).await?;
        }
        info!(types = self.types.len(), "Index deleted");
        Ok(())
    }

    /// Drop and recreate every type's collection.
    pub async fn reset(&self) -> Result<(), SearchIndexError> {
        self.delete().await?;
        self.create().await
    }

    fn slot(&self, name: &str) -> Result<&TypeSlot, SearchIndexError> {
        self.types
            .get(name)
            .ok_or_else(|| SearchIndexError::type_not_found(&self.id, name))
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;

    fn shop(store: Arc<MemoryStore>) -> Index {
        Index::new(
            "shop",
            store,
            json!({"number_of_shards": 1}),
            vec![
                (
                    "product".to_string(),
                    json!({"mappings": {"properties": {"name": {"type": "text"}}}}),
                ),
                ("order".to_string(), json!({})),
            ],
        )
    }

    #[test]
    fn test_get_type_is_memoized() {
        let index = shop(Arc::new(MemoryStore::new()));

        let first = index.get_type("product").unwrap();
        let second = index.get_type("product").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "product");
        assert_eq!(first.index_id(), "shop");
    }

    #[test]
    fn test_get_unknown_type() {
        let index = shop(Arc::new(MemoryStore::new()));

        let result = index.get_type("customer");
        assert!(matches!(
            result,
            Err(SearchIndexError::TypeNotFound { ref index, ref type_name })
                if index == "shop" && type_name == "customer"
        ));
    }

    #[test]
    fn test_create_body_passes_settings_through() {
        let index = shop(Arc::new(MemoryStore::new()));

        let body = index.create_body("product").unwrap();
        assert_eq!(body["settings"]["number_of_shards"], 1);
        assert_eq!(body["mappings"]["properties"]["name"]["type"], "text");

        let body = index.create_body("order").unwrap();
        assert!(body.get("mappings").is_none());
    }

    #[test]
    fn test_create_body_without_settings() {
        let index = Index::new(
            "bare",
            Arc::new(MemoryStore::new()),
            Value::Null,
            vec![("item".to_string(), json!({}))],
        );

        assert_eq!(index.create_body("item").unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_reset_recreates_every_type() {
        let store = Arc::new(MemoryStore::new());
        let index = shop(store.clone());

        index.create().await.unwrap();
        assert!(store.collection("shop", "product").await.is_some());
        assert!(store.collection("shop", "order").await.is_some());

        index.reset().await.unwrap();
        let created = store.collection("shop", "product").await.unwrap();
        assert_eq!(created["settings"]["number_of_shards"], 1);

        index.delete().await.unwrap();
        assert!(store.collection("shop", "order").await.is_none());
    }
}
