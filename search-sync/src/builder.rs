//! Setup phase: configuration plus code-side registrations into a running
//! synchronization context.

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{EntityConfig, SyncConfig};
use crate::records::{FieldTransformer, JsonLinesFetcher, JsonRecord};
use crate::IndexingError;
use search_sync_pipeline::{
    LifecycleListener, PopulationFetcher, Populator, RegisteredTransformer, Synchronizer,
    Transformer, TransformerManager,
};
use search_sync_repository::{Index, IndexManager, SearchStore};
use search_sync_shared::EntityClass;

/// Registered components, read-only once built.
pub struct SyncContext {
    pub index_manager: Arc<IndexManager>,
    pub transformers: Arc<TransformerManager>,
    pub listener: LifecycleListener,
}

impl SyncContext {
    /// Build a populator for a configured type.
    pub fn populator<F: PopulationFetcher>(
        &self,
        index_name: &str,
        type_name: &str,
        fetcher: F,
    ) -> Result<Populator<F>, IndexingError> {
        let doc_type = self.index_manager.get_type(index_name, type_name)?;
        Ok(Populator::new(doc_type, fetcher, self.transformers.clone()))
    }

    /// Build a populator reading [`JsonRecord`]s from a JSON-lines file.
    ///
    /// Uses the record transformer configured for the type, if any. An
    /// explicit `id_field`, or a type without one, gets a [`FieldTransformer`]
    /// for this run only.
    pub fn json_lines_populator(
        &self,
        index_name: &str,
        type_name: &str,
        source: impl Into<PathBuf>,
        id_field: Option<&str>,
    ) -> Result<Populator<JsonLinesFetcher>, IndexingError> {
        let fetcher = JsonLinesFetcher::new(source);
        let configured = self.transformers.has_transformer(
            EntityClass::of::<JsonRecord>(),
            index_name,
            type_name,
        );

        if configured && id_field.is_none() {
            return self.populator(index_name, type_name, fetcher);
        }

        let transformer = id_field.map(FieldTransformer::new).unwrap_or_default();
        debug!(
            index = %index_name,
            doc_type = %type_name,
            id_field = %transformer.id_field(),
            "Populating with a field transformer"
        );

        let doc_type = self.index_manager.get_type(index_name, type_name)?;
        let mut transformers = TransformerManager::new();
        transformers.register_transformer(transformer, index_name, type_name);
        Ok(Populator::new(doc_type, fetcher, Arc::new(transformers)))
    }
}

/// Collects what the configuration refers to by name (store clients, entity
/// classes, transformers) and walks the configuration to register indexes,
/// transformers and synchronizers.
pub struct SyncBuilder {
    config: SyncConfig,
    clients: HashMap<String, Arc<dyn SearchStore>>,
    entities: HashMap<String, EntityClass>,
    transformers: HashMap<String, RegisteredTransformer>,
    registrations: Vec<(RegisteredTransformer, String, String)>,
}

impl SyncBuilder {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            clients: HashMap::new(),
            entities: HashMap::new(),
            transformers: HashMap::new(),
            registrations: Vec::new(),
        }
    }

    /// Provide the store behind a configured client name.
    pub fn client(mut self, name: impl Into<String>, store: Arc<dyn SearchStore>) -> Self {
        self.clients.insert(name.into(), store);
        self
    }

    /// Make entity class `E` known under `name`.
    pub fn entity<E: Any>(mut self, name: impl Into<String>) -> Self {
        self.entities.insert(name.into(), EntityClass::of::<E>());
        self
    }

    /// Make a transformer known under `name`.
    pub fn transformer<T: Transformer>(mut self, name: impl Into<String>, transformer: T) -> Self {
        self.transformers
            .insert(name.into(), RegisteredTransformer::new(transformer));
        self
    }

    /// Register a transformer for a destination directly, outside the
    /// configuration.
    pub fn register<T: Transformer>(
        mut self,
        index_name: impl Into<String>,
        type_name: impl Into<String>,
        transformer: T,
    ) -> Self {
        self.registrations.push((
            RegisteredTransformer::new(transformer),
            index_name.into(),
            type_name.into(),
        ));
        self
    }

    /// Validate the configuration against the registrations and build the
    /// context.
    ///
    /// # Returns
    ///
    /// * `Ok(SyncContext)` - Every index, transformer and synchronizer registered
    /// * `Err(IndexingError::ConfigError)` - If a client, entity or transformer
    ///   name does not resolve, or a transformer does not accept its entity
    /// * `Err(IndexingError::SearchError)` - If two types would share a store
    ///   collection
    pub fn build(self) -> Result<SyncContext, IndexingError> {
        self.config.validate()?;

        let index_manager = Arc::new(self.build_indexes()?);
        let transformers = Arc::new(self.build_transformers(&index_manager)?);
        let listener = self.build_listener(&index_manager, &transformers)?;

        info!(
            indexes = index_manager.index_ids().len(),
            synchronizers = listener.synchronizers().len(),
            "Synchronization context built"
        );

        Ok(SyncContext {
            index_manager,
            transformers,
            listener,
        })
    }

    fn build_indexes(&self) -> Result<IndexManager, IndexingError> {
        let mut manager = IndexManager::new();

        for (index_name, index_config) in &self.config.indexes {
            let client_name = self.config.client_for(index_config);
            let client = self.clients.get(client_name).cloned().ok_or_else(|| {
                IndexingError::config(format!(
                    "No store provided for client \"{}\" used by index \"{}\"",
                    client_name, index_name
                ))
            })?;

            let types = index_config
                .types
                .iter()
                .map(|(type_name, type_config)| (type_name.clone(), type_config.settings()));

            manager.register_index(Index::new(
                index_name.as_str(),
                client,
                index_config.settings.clone(),
                types,
            ))?;
            debug!(index = %index_name, client = %client_name, "Index registered");
        }

        Ok(manager)
    }

    fn build_transformers(&self, indexes: &IndexManager) -> Result<TransformerManager, IndexingError> {
        let mut manager = TransformerManager::new();

        for (index_name, type_name, entity_name, entity_config) in self.entity_bindings() {
            let Some(transformer_name) = &entity_config.transformer else {
                continue;
            };
            let class = self.entity_class(entity_name)?;
            let transformer = self.transformers.get(transformer_name).ok_or_else(|| {
                IndexingError::config(format!("Unknown transformer \"{}\"", transformer_name))
            })?;

            if transformer.class() != class {
                return Err(IndexingError::config(format!(
                    "Transformer \"{}\" accepts {}, not entity \"{}\" ({})",
                    transformer_name,
                    transformer.class(),
                    entity_name,
                    class
                )));
            }

            manager.register(transformer.clone(), index_name, type_name);
        }

        for (transformer, index_name, type_name) in &self.registrations {
            // Fails on unknown destinations.
            indexes.get_type(index_name, type_name)?;
            manager.register(transformer.clone(), index_name, type_name);
        }

        Ok(manager)
    }

    fn build_listener(
        &self,
        indexes: &IndexManager,
        transformers: &Arc<TransformerManager>,
    ) -> Result<LifecycleListener, IndexingError> {
        let mut listener = LifecycleListener::new();

        if !self.config.synchronization_listeners.enabled {
            info!("Synchronization listeners disabled");
            return Ok(listener);
        }

        for (index_name, type_name, entity_name, entity_config) in self.entity_bindings() {
            let class = self.entity_class(entity_name)?;
            let doc_type = indexes.get_type(index_name, type_name)?;

            listener.add_synchronizer(
                Synchronizer::new(class, doc_type, transformers.clone())
                    .on_create(entity_config.on_create)
                    .on_update(entity_config.on_update)
                    .on_delete(entity_config.on_delete),
            );
        }

        Ok(listener)
    }

    /// Every (index, type, entity) triple in the configuration.
    fn entity_bindings(
        &self,
    ) -> impl Iterator<Item = (&str, &str, &str, &EntityConfig)> {
        self.config.indexes.iter().flat_map(|(index_name, index)| {
            index.types.iter().flat_map(move |(type_name, doc_type)| {
                doc_type.entities.iter().map(move |(entity_name, entity)| {
                    (
                        index_name.as_str(),
                        type_name.as_str(),
                        entity_name.as_str(),
                        entity,
                    )
                })
            })
        })
    }

    fn entity_class(&self, name: &str) -> Result<EntityClass, IndexingError> {
        self.entities
            .get(name)
            .copied()
            .ok_or_else(|| IndexingError::config(format!("Unknown entity \"{}\"", name)))
    }
}
