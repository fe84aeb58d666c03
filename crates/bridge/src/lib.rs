//! Modelrelay bridge crate.
//!
//! Connects a job-record store to a model inference provider: an inbound
//! request is validated, its record is moved through `IN_PROGRESS` to
//! `COMPLETED` or `ERROR`, and the outcome is returned as a JSON envelope
//! with the matching status code. The invocation logic itself lives in
//! `modelrelay-inference`.

pub mod config;
pub mod processor;
pub mod store;

use std::sync::Arc;

pub use config::{BridgeConfig, InferenceConfig, StoreConfig};
pub use processor::{InboundRequest, RequestProcessor};
pub use store::{
    MemoryRecordStore, RecordStatus, RecordStore, RecordUpdate, RestRecordStore, StoreError,
};

/// Build the record store the configuration asks for.
pub fn build_store(config: &StoreConfig) -> Arc<dyn RecordStore> {
    if config.is_remote() {
        Arc::new(RestRecordStore::new(
            config.url.clone(),
            config.api_key.clone(),
            config.table.clone(),
        ))
    } else {
        tracing::warn!("SUPABASE_URL is not set; request records are kept in memory");
        Arc::new(MemoryRecordStore::new())
    }
}
