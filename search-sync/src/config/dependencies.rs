//! Dependency initialization and wiring for the search sync binary.

use std::env;
use std::sync::Arc;
use tracing::info;

use crate::builder::{SyncBuilder, SyncContext};
use crate::config::SyncConfig;
use crate::records::{FieldTransformer, JsonRecord};
use crate::IndexingError;
use search_sync_repository::OpenSearchStore;

/// Default configuration path.
const DEFAULT_CONFIG_PATH: &str = "search-sync.json";

/// Entity name of [`JsonRecord`] in the configuration.
pub const RECORD_ENTITY: &str = "record";

/// Transformer name of the default [`FieldTransformer`] in the configuration.
pub const FIELDS_TRANSFORMER: &str = "fields";

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: SyncConfig,
    pub context: SyncContext,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_SYNC_CONFIG`: Configuration file path (default: search-sync.json)
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration cannot be loaded or wired
    pub async fn new() -> Result<Self, IndexingError> {
        let config_path =
            env::var("SEARCH_SYNC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        info!(config_path = %config_path, "Initializing dependencies");

        let config = SyncConfig::load(&config_path).await?;
        Self::from_config(config)
    }

    /// Wire an OpenSearch store per configured client.
    ///
    /// [`JsonRecord`] is known as entity `record`, and a [`FieldTransformer`]
    /// on the `id` field as transformer `fields`.
    pub fn from_config(config: SyncConfig) -> Result<Self, IndexingError> {
        let mut builder = SyncBuilder::new(config.clone())
            .entity::<JsonRecord>(RECORD_ENTITY)
            .transformer(FIELDS_TRANSFORMER, FieldTransformer::default());

        for (name, client) in &config.clients {
            let store = OpenSearchStore::from_hosts(&client.hosts)
                .map_err(|e| {
                    IndexingError::config(format!("Failed to create client \"{}\": {}", name, e))
                })?
                .with_request_logging(client.logging);

            info!(client = %name, hosts = ?client.hosts, "Search client created");
            builder = builder.client(name.as_str(), Arc::new(store));
        }

        let context = builder.build()?;

        Ok(Self { config, context })
    }
}
