//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchStore`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchStore;
use crate::opensearch::index_config::physical_index_name;
use search_sync_shared::Document;

/// Bulk action a request was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkAction {
    Index,
    Delete,
}

impl BulkAction {
    fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Delete => "delete",
        }
    }
}

/// OpenSearch store implementation.
///
/// # Example
///
/// ```ignore
/// let store = OpenSearchStore::new("http://localhost:9200")?;
/// let document = Document::new("42", body).located_at("shop", "product");
/// // Overwrites any existing document with id "42"
/// store.put_documents(&[document]).await?;
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    log_requests: bool,
}

impl OpenSearchStore {
    /// Create a new store connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new store instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub fn new(url: &str) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(url = %url, "Created OpenSearch store");

        Ok(Self {
            client: OpenSearch::new(transport),
            log_requests: false,
        })
    }

    /// Create a store from a configured host list.
    ///
    /// Requests go to the first host.
    pub fn from_hosts(hosts: &[String]) -> Result<Self, SearchIndexError> {
        let first = hosts
            .first()
            .ok_or_else(|| SearchIndexError::connection("no hosts configured"))?;

        if hosts.len() > 1 {
            warn!(
                host = %first,
                ignored = hosts.len() - 1,
                "Only the first configured host is used"
            );
        }

        Self::new(first)
    }

    /// Log every bulk request at info level.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    fn bulk_body(action: BulkAction, documents: &[Document]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);

        for doc in documents {
            let target = physical_index_name(&doc.index_name, &doc.type_name);
            body.push(json!({ action.as_str(): { "_index": target, "_id": doc.id } }).into());
            if action == BulkAction::Index {
                body.push(Value::Object(doc.body.clone()).into());
            }
        }

        body
    }

    /// Collect the per-item failures of a bulk response.
    ///
    /// A `404` on delete means the document was already gone and is not a
    /// failure.
    fn bulk_failures(action: BulkAction, response: &Value) -> Vec<String> {
        if !response
            .get("errors")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Vec::new();
        }

        let items = match response.get("items").and_then(Value::as_array) {
            Some(items) => items,
            None => return vec!["bulk response reported errors without items".to_string()],
        };

        items
            .iter()
            .filter_map(|item| item.get(action.as_str()))
            .filter(|result| {
                let status = result.get("status").and_then(Value::as_u64).unwrap_or(0);
                let missing = action == BulkAction::Delete && status == 404;
                !missing && (result.get("error").is_some() || status >= 300)
            })
            .map(|result| {
                let id = result.get("_id").and_then(Value::as_str).unwrap_or("?");
                let reason = result
                    .get("error")
                    .and_then(|e| e.get("reason"))
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                format!("{}: {}", id, reason)
            })
            .collect()
    }

    async fn send_bulk(
        &self,
        action: BulkAction,
        documents: &[Document],
    ) -> Result<(), String> {
        if self.log_requests {
            info!(action = action.as_str(), count = documents.len(), "Sending bulk request");
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(Self::bulk_body(action, documents))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(format!("bulk request failed with status {}: {}", status, error_body));
        }

        let response_body: Value = response.json().await.map_err(|e| e.to_string())?;
        let failures = Self::bulk_failures(action, &response_body);
        if !failures.is_empty() {
            error!(action = action.as_str(), failed = failures.len(), "Bulk items rejected");
            return Err(format!(
                "{} of {} documents rejected: {}",
                failures.len(),
                documents.len(),
                failures.join("; ")
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl SearchStore for OpenSearchStore {
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn put_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        self.send_bulk(BulkAction::Index, documents)
            .await
            .map_err(SearchIndexError::write)?;

        debug!("Documents indexed");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn delete_documents(&self, documents: &[Document]) -> Result<(), SearchIndexError> {
        self.send_bulk(BulkAction::Delete, documents)
            .await
            .map_err(SearchIndexError::delete)?;

        debug!("Documents deleted");
        Ok(())
    }

    async fn create_type(
        &self,
        index_name: &str,
        type_name: &str,
        body: &Value,
    ) -> Result<(), SearchIndexError> {
        let target = physical_index_name(index_name, type_name);

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&target))
            .body(body.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating {} failed with status {}: {}",
                target, status, error_body
            )));
        }

        info!(index = %target, "Created OpenSearch index");
        Ok(())
    }

    async fn delete_type(&self, index_name: &str, type_name: &str) -> Result<(), SearchIndexError> {
        let target = physical_index_name(index_name, type_name);

        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[target.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index deletion failed");
            return Err(SearchIndexError::index_creation(format!(
                "Deleting {} failed with status {}: {}",
                target, status, error_body
            )));
        }

        info!(index = %target, "Deleted OpenSearch index");
        Ok(())
    }

    fn collection_name(&self, index_name: &str, type_name: &str) -> Option<String> {
        Some(physical_index_name(index_name, type_name))
    }
}
