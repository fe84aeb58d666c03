use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Errors emitted by record store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("record store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Lifecycle status of a request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    InProgress,
    Completed,
    Error,
}

/// Partial field set applied to a record. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl RecordUpdate {
    pub fn in_progress() -> Self {
        Self::status(RecordStatus::InProgress)
    }

    pub fn completed(
        output_data: Value,
        processing_time: u64,
        token_count: Option<u64>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            output_data: Some(output_data),
            completed_at: Some(completed_at),
            processing_time: Some(processing_time),
            token_count,
            ..Self::status(RecordStatus::Completed)
        }
    }

    pub fn error(message: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            completed_at: Some(completed_at),
            error_msg: Some(message.into()),
            ..Self::status(RecordStatus::Error)
        }
    }

    fn status(status: RecordStatus) -> Self {
        Self {
            status,
            output_data: None,
            completed_at: None,
            processing_time: None,
            token_count: None,
            error_msg: None,
        }
    }
}

/// Backend trait for persisting request records.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn update_record(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError>;
}

/// In-process store that keeps every update applied to each record.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    updates: Mutex<HashMap<String, Vec<RecordUpdate>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates applied to `id`, oldest first.
    pub fn history(&self, id: &str) -> Vec<RecordUpdate> {
        self.updates.lock().get(id).cloned().unwrap_or_default()
    }

    /// Status after the most recent update to `id`.
    pub fn status(&self, id: &str) -> Option<RecordStatus> {
        self.updates
            .lock()
            .get(id)
            .and_then(|history| history.last())
            .map(|update| update.status)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn update_record(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError> {
        self.updates
            .lock()
            .entry(id.to_string())
            .or_default()
            .push(update.clone());
        Ok(())
    }
}

/// PostgREST-backed store (`PATCH {url}/rest/v1/{table}?id=eq.{id}`).
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestRecordStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn update_record(&self, id: &str, update: &RecordUpdate) -> Result<(), StoreError> {
        let filter = format!("eq.{id}");
        let response = self
            .client
            .patch(self.table_url())
            .query(&[("id", filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Record {} updated to {:?}", id, update.status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_in_progress_serializes_status_only() {
        let value = serde_json::to_value(RecordUpdate::in_progress()).unwrap();
        assert_eq!(value, json!({"status": "IN_PROGRESS"}));
    }

    #[test]
    fn test_completed_update_fields() {
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let update = RecordUpdate::completed(json!({"output": "hi"}), 42, Some(1), at);
        let value = serde_json::to_value(&update).unwrap();

        assert_eq!(value["status"], "COMPLETED");
        assert_eq!(value["output_data"]["output"], "hi");
        assert_eq!(value["completed_at"], "2024-01-02T03:04:05Z");
        assert_eq!(value["processing_time"], 42);
        assert_eq!(value["token_count"], 1);
        assert!(value.get("error_msg").is_none());
    }

    #[test]
    fn test_error_update_fields() {
        let update = RecordUpdate::error("Request timed out", Utc::now());
        let value = serde_json::to_value(&update).unwrap();

        assert_eq!(value["status"], "ERROR");
        assert_eq!(value["error_msg"], "Request timed out");
        assert!(value.get("output_data").is_none());
    }

    #[tokio::test]
    async fn test_memory_store_keeps_history() {
        let store = MemoryRecordStore::new();
        store
            .update_record("r1", &RecordUpdate::in_progress())
            .await
            .unwrap();
        store
            .update_record("r1", &RecordUpdate::error("boom", Utc::now()))
            .await
            .unwrap();

        let history = store.history("r1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, RecordStatus::InProgress);
        assert_eq!(store.status("r1"), Some(RecordStatus::Error));
        assert!(store.history("r2").is_empty());
        assert_eq!(store.status("r2"), None);
    }

    #[test]
    fn test_rest_store_url() {
        let store = RestRecordStore::new("https://db.example.com/", "key", "model_requests");
        assert_eq!(
            store.table_url(),
            "https://db.example.com/rest/v1/model_requests"
        );
    }

    #[tokio::test]
    async fn test_rest_store_patches_record_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/model_requests"))
            .and(query_param("id", "eq.r1"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("prefer", "return=minimal"))
            .and(body_json(json!({"status": "IN_PROGRESS"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestRecordStore::new(server.uri(), "anon-key", "model_requests");
        store
            .update_record("r1", &RecordUpdate::in_progress())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rest_store_rejected_update_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/model_requests"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let store = RestRecordStore::new(server.uri(), "wrong-key", "model_requests");
        let err = store
            .update_record("r1", &RecordUpdate::error("boom", Utc::now()))
            .await
            .unwrap_err();
        match err {
            StoreError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "Invalid API key");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
