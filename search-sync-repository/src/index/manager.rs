//! Index registry.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::SearchIndexError;
use crate::index::{Index, Type};

/// Registry of index handles keyed by logical index name.
///
/// Registration takes `&mut self`; once the manager is shared behind an
/// `Arc` it is read-only.
#[derive(Debug, Default)]
pub struct IndexManager {
    indexes: Vec<Arc<Index>>,
    positions: HashMap<String, usize>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Index>)` - The registered handle
    /// * `Err(SearchIndexError::DuplicateIndex)` - If the id is already taken;
    ///   the existing registration is left untouched
    /// * `Err(SearchIndexError::CollectionConflict)` - If one of its types
    ///   would share a store collection with another registered type
    pub fn register_index(&mut self, index: Index) -> Result<Arc<Index>, SearchIndexError> {
        if self.positions.contains_key(index.id()) {
            return Err(SearchIndexError::duplicate_index(index.id()));
        }
        self.check_collections(&index)?;

        let index = Arc::new(index);
        self.positions
            .insert(index.id().to_string(), self.indexes.len());
        self.indexes.push(index.clone());

        debug!(index = %index.id(), "Index registered");
        Ok(index)
    }

    /// Resolve an index by exact name.
    pub fn get_index(&self, name: &str) -> Result<Arc<Index>, SearchIndexError> {
        self.positions
            .get(name)
            .map(|&position| self.indexes[position].clone())
            .ok_or_else(|| SearchIndexError::index_not_found(name))
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Registered index ids, in registration order.
    pub fn index_ids(&self) -> Vec<String> {
        self.indexes.iter().map(|index| index.id().to_string()).collect()
    }

    /// Registered index handles, in registration order.
    pub fn indexes(&self) -> Vec<Arc<Index>> {
        self.indexes.clone()
    }

    /// Resolve a type handle through its index.
    pub fn get_type(&self, index: &str, type_name: &str) -> Result<Arc<Type>, SearchIndexError> {
        self.get_index(index)?.get_type(type_name)
    }

    /// Reject `index` if any of its types resolves to a collection already
    /// claimed on the same store, by another index or by a sibling type.
    fn check_collections(&self, index: &Index) -> Result<(), SearchIndexError> {
        let mut claimed: HashMap<String, String> = HashMap::new();

        let same_store = self
            .indexes
            .iter()
            .map(|existing| existing.as_ref())
            .filter(|existing| shares_store(existing, index));

        for candidate in same_store.chain(std::iter::once(index)) {
            for type_name in candidate.type_names() {
                let Some(collection) = index.client().collection_name(candidate.id(), &type_name)
                else {
                    continue;
                };

                let owner = format!("{}/{}", candidate.id(), type_name);
                if let Some(first) = claimed.insert(collection.clone(), owner.clone()) {
                    return Err(SearchIndexError::collection_conflict(collection, first, owner));
                }
            }
        }

        Ok(())
    }
}

fn shares_store(a: &Index, b: &Index) -> bool {
    Arc::as_ptr(a.client()) as *const () == Arc::as_ptr(b.client()) as *const ()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::SearchStore;
    use crate::memory::MemoryStore;
    use crate::opensearch::OpenSearchStore;
    use serde_json::json;

    fn index(id: &str) -> Index {
        Index::new(
            id,
            Arc::new(MemoryStore::new()),
            json!({}),
            vec![("item".to_string(), json!({}))],
        )
    }

    #[test]
    fn test_register_and_resolve() {
        let mut manager = IndexManager::new();
        let registered = manager.register_index(index("shop")).unwrap();

        assert!(manager.has_index("shop"));
        assert!(Arc::ptr_eq(&registered, &manager.get_index("shop").unwrap()));
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let mut manager = IndexManager::new();
        let original = manager.register_index(index("shop")).unwrap();

        let result = manager.register_index(index("shop"));
        assert!(matches!(result, Err(SearchIndexError::DuplicateIndex(ref id)) if id == "shop"));

        assert_eq!(manager.index_ids(), vec!["shop".to_string()]);
        assert!(Arc::ptr_eq(&original, &manager.get_index("shop").unwrap()));
    }

    #[test]
    fn test_unknown_index() {
        let mut manager = IndexManager::new();
        manager.register_index(index("shop")).unwrap();

        assert!(!manager.has_index("sho"));
        assert!(matches!(
            manager.get_index("sho"),
            Err(SearchIndexError::IndexNotFound(ref id)) if id == "sho"
        ));
    }

    #[test]
    fn test_snapshots_follow_registration_order() {
        let mut manager = IndexManager::new();
        for id in ["zeta", "alpha", "mid"] {
            manager.register_index(index(id)).unwrap();
        }

        assert_eq!(manager.index_ids(), vec!["zeta", "alpha", "mid"]);
        let ids: Vec<String> = manager
            .indexes()
            .iter()
            .map(|index| index.id().to_string())
            .collect();
        assert_eq!(ids, manager.index_ids());
    }

    #[test]
    fn test_get_type_through_manager() {
        let mut manager = IndexManager::new();
        manager.register_index(index("shop")).unwrap();

        assert_eq!(manager.get_type("shop", "item").unwrap().name(), "item");
        assert!(matches!(
            manager.get_type("shop", "other"),
            Err(SearchIndexError::TypeNotFound { .. })
        ));
        assert!(matches!(
            manager.get_type("nope", "item"),
            Err(SearchIndexError::IndexNotFound(_))
        ));
    }

    fn index_on(id: &str, store: &Arc<dyn SearchStore>, types: &[&str]) -> Index {
        Index::new(
            id,
            store.clone(),
            json!({}),
            types.iter().map(|name| (name.to_string(), json!({}))),
        )
    }

    #[test]
    fn test_folded_names_cannot_share_a_collection() {
        let store: Arc<dyn SearchStore> =
            Arc::new(OpenSearchStore::new("http://localhost:9200").unwrap());
        let mut manager = IndexManager::new();
        manager
            .register_index(index_on("shop_eu", &store, &["product"]))
            .unwrap();

        let result = manager.register_index(index_on("shop", &store, &["eu_product"]));
        assert!(matches!(
            result,
            Err(SearchIndexError::CollectionConflict { ref collection, .. })
                if collection == "shop_eu_product"
        ));
        assert!(!manager.has_index("shop"));
    }

    #[test]
    fn test_case_variants_cannot_share_a_collection() {
        let store: Arc<dyn SearchStore> =
            Arc::new(OpenSearchStore::new("http://localhost:9200").unwrap());
        let mut manager = IndexManager::new();
        manager
            .register_index(index_on("Shop", &store, &["product"]))
            .unwrap();

        assert!(matches!(
            manager.register_index(index_on("shop", &store, &["product"])),
            Err(SearchIndexError::CollectionConflict { .. })
        ));

        // Sibling types of one index are checked as well.
        assert!(matches!(
            manager.register_index(index_on("blog", &store, &["Post", "post"])),
            Err(SearchIndexError::CollectionConflict { .. })
        ));
    }

    #[test]
    fn test_separate_stores_do_not_conflict() {
        let first: Arc<dyn SearchStore> =
            Arc::new(OpenSearchStore::new("http://search-1:9200").unwrap());
        let second: Arc<dyn SearchStore> =
            Arc::new(OpenSearchStore::new("http://search-2:9200").unwrap());
        let mut manager = IndexManager::new();

        manager
            .register_index(index_on("shop_eu", &first, &["product"]))
            .unwrap();
        assert!(manager
            .register_index(index_on("shop", &second, &["eu_product"]))
            .is_ok());
    }

    #[test]
    fn test_memory_store_keeps_pairs_apart() {
        let store: Arc<dyn SearchStore> = Arc::new(MemoryStore::new());
        let mut manager = IndexManager::new();

        manager
            .register_index(index_on("shop_eu", &store, &["product"]))
            .unwrap();
        assert!(manager
            .register_index(index_on("shop", &store, &["eu_product"]))
            .is_ok());
    }
}
