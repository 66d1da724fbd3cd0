//! Search document type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single unit written to (or deleted from) the search store.
///
/// Transformers usually only supply the id and the body; the index/type
/// coordinates are stamped by the transformer registry for the destination
/// the document was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier. Writing the same id twice overwrites.
    pub id: String,
    /// Logical index the document belongs to.
    pub index_name: String,
    /// Type within the index.
    pub type_name: String,
    /// Field payload, in insertion order.
    pub body: Map<String, Value>,
}

impl Document {
    /// Create a document without index/type coordinates.
    pub fn new(id: impl ToString, body: Map<String, Value>) -> Self {
        Self {
            id: id.to_string(),
            index_name: String::new(),
            type_name: String::new(),
            body,
        }
    }

    /// Create a document from a JSON value.
    ///
    /// Objects become the body as-is; any other value is stored under a
    /// single `value` field.
    pub fn from_value(id: impl ToString, value: Value) -> Self {
        let body = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self::new(id, body)
    }

    /// Set a body field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    /// Place the document at the given index/type coordinates.
    pub fn located_at(mut self, index_name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self.type_name = type_name.into();
        self
    }

    /// Check whether the document targets the given index/type.
    pub fn is_located_at(&self, index_name: &str, type_name: &str) -> bool {
        self.index_name == index_name && self.type_name == type_name
    }

    /// Check whether the document carries a usable id.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
