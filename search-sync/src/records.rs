//! Schemaless records read from JSON-lines files.
//!
//! Lets the binary backfill a type without any compiled-in entity: each line
//! of the source file is one JSON object, turned into a document by copying
//! its fields.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use search_sync_pipeline::{PipelineError, PopulationFetcher, TransformError, Transformer};
use search_sync_shared::Document;

/// Field used as document id unless configured otherwise.
pub const DEFAULT_ID_FIELD: &str = "id";

/// One JSON object record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonRecord(pub Map<String, Value>);

impl JsonRecord {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for JsonRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Copies every field of a record into one document, taking the id from
/// `id_field`.
#[derive(Debug, Clone)]
pub struct FieldTransformer {
    id_field: String,
}

impl FieldTransformer {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }
}

impl Default for FieldTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_ID_FIELD)
    }
}

impl Transformer for FieldTransformer {
    type Entity = JsonRecord;

    fn transform(&self, record: &JsonRecord) -> Result<Vec<Document>, TransformError> {
        let id = match record.fields().get(&self.id_field) {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(TransformError::new(format!(
                    "record has no usable \"{}\" field",
                    self.id_field
                )))
            }
        };

        Ok(vec![Document::new(id, record.fields().clone())])
    }
}

/// Pages through a JSON-lines file. Blank lines are not records.
///
/// The file is re-read for every page so only one page is held in memory.
#[derive(Debug, Clone)]
pub struct JsonLinesFetcher {
    path: PathBuf,
}

impl JsonLinesFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn lines(&self) -> Result<tokio::io::Lines<BufReader<File>>, PipelineError> {
        let file = File::open(&self.path).await.map_err(|e| {
            PipelineError::fetch(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        Ok(BufReader::new(file).lines())
    }

    fn read_error(&self, e: std::io::Error) -> PipelineError {
        PipelineError::fetch(format!("Failed to read {}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl PopulationFetcher for JsonLinesFetcher {
    type Entity = JsonRecord;

    async fn entity_count(&self) -> Result<usize, PipelineError> {
        let mut lines = self.lines().await?;
        let mut count = 0;

        while let Some(line) = lines.next_line().await.map_err(|e| self.read_error(e))? {
            if !line.trim().is_empty() {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn fetch_entities(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JsonRecord>, PipelineError> {
        let mut lines = self.lines().await?;
        let mut records = Vec::with_capacity(limit);
        let mut position = 0;
        let mut line_number = 0;

        while records.len() < limit {
            let Some(line) = lines.next_line().await.map_err(|e| self.read_error(e))? else {
                break;
            };
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            if position >= offset {
                match serde_json::from_str::<Value>(&line) {
                    Ok(Value::Object(fields)) => records.push(JsonRecord(fields)),
                    Ok(_) => {
                        return Err(PipelineError::fetch(format!(
                            "{}:{}: not a JSON object",
                            self.path.display(),
                            line_number
                        )))
                    }
                    Err(e) => {
                        return Err(PipelineError::fetch(format!(
                            "{}:{}: {}",
                            self.path.display(),
                            line_number,
                            e
                        )))
                    }
                }
            }
            position += 1;
        }

        Ok(records)
    }
}
