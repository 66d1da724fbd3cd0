//! Static configuration.
//!
//! The configuration names store clients, indexes with their types, and for
//! each type the entity classes mirrored into it:
//!
//! ```json
//! {
//!   "default_client": "default",
//!   "clients": { "default": { "hosts": ["http://localhost:9200"] } },
//!   "indexes": {
//!     "shop": {
//!       "settings": { "number_of_shards": 1 },
//!       "types": {
//!         "product": {
//!           "mappings": { "properties": { "name": { "type": "text" } } },
//!           "entities": { "record": { "on_update": false, "transformer": "fields" } }
//!         }
//!       }
//!     }
//!   },
//!   "synchronization_listeners": { "enabled": true }
//! }
//! ```

mod dependencies;

pub use dependencies::Dependencies;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::IndexingError;

/// Client used by indexes that do not name one.
pub const DEFAULT_CLIENT: &str = "default";

/// Host used by clients that do not list any.
pub const DEFAULT_HOST: &str = "http://localhost:9200";

/// Root of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default = "default_client")]
    pub default_client: String,
    #[serde(default)]
    pub clients: BTreeMap<String, ClientConfig>,
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexConfig>,
    #[serde(default)]
    pub synchronization_listeners: ListenerConfig,
}

/// Event-driven synchronization switch.
///
/// When disabled no synchronizer is wired; indexes, transformers and
/// populators are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
}

/// A search store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
    /// Log every request sent to the store.
    #[serde(default)]
    pub logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Overrides `default_client`.
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default = "empty_object")]
    pub settings: Value,
    #[serde(default)]
    pub types: BTreeMap<String, TypeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeConfig {
    #[serde(default = "empty_object")]
    pub mappings: Value,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityConfig>,
}

/// How one entity class is mirrored into a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    #[serde(default = "enabled")]
    pub on_create: bool,
    #[serde(default = "enabled")]
    pub on_update: bool,
    #[serde(default = "enabled")]
    pub on_delete: bool,
    /// Name of a transformer known to the builder. Optional, transformers can
    /// also be registered in code.
    #[serde(default)]
    pub transformer: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_client: default_client(),
            clients: BTreeMap::from([(default_client(), ClientConfig::default())]),
            indexes: BTreeMap::new(),
            synchronization_listeners: ListenerConfig::default(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            logging: false,
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            on_create: true,
            on_update: true,
            on_delete: true,
            transformer: None,
        }
    }
}

impl SyncConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(raw: &str) -> Result<Self, IndexingError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| IndexingError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, IndexingError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            IndexingError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Check that every client reference resolves.
    pub fn validate(&self) -> Result<(), IndexingError> {
        if !self.clients.contains_key(&self.default_client) {
            return Err(IndexingError::config(format!(
                "Default client \"{}\" must be configured in clients",
                self.default_client
            )));
        }

        for (index_name, index) in &self.indexes {
            if let Some(client) = &index.client {
                if !self.clients.contains_key(client) {
                    return Err(IndexingError::config(format!(
                        "Index \"{}\" uses unknown client \"{}\"",
                        index_name, client
                    )));
                }
            }
        }

        Ok(())
    }

    /// Client name an index writes through.
    pub fn client_for<'a>(&'a self, index: &'a IndexConfig) -> &'a str {
        index.client.as_deref().unwrap_or(&self.default_client)
    }
}

impl TypeConfig {
    /// Type-level settings passed to the store.
    ///
    /// Empty mappings are left out.
    pub fn settings(&self) -> Value {
        if is_empty(&self.mappings) {
            json!({})
        } else {
            json!({ "mappings": self.mappings })
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn default_client() -> String {
    DEFAULT_CLIENT.to_string()
}

fn default_hosts() -> Vec<String> {
    vec![DEFAULT_HOST.to_string()]
}

fn empty_object() -> Value {
    json!({})
}

fn enabled() -> bool {
    true
}
