//! Request processing: validation, record lifecycle and inference

use crate::store::{RecordStore, RecordUpdate};
use chrono::Utc;
use modelrelay_inference::response::SuccessEnvelope;
use modelrelay_inference::{
    format_error, format_outcome, ClientResult, Failure, InferenceClient, InvocationOutcome,
    InvocationRequest, ModelType, Parameters, RequestInput, Response, Success,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

pub const INVALID_INPUT_MESSAGE: &str = "Invalid input: must be a non-empty string";

/// Inbound request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    pub id: String,
    #[serde(default)]
    pub input: Option<RequestInput>,
    pub model_id: String,
    #[serde(default, rename = "type")]
    pub model_type: ModelType,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

impl InboundRequest {
    /// Parse a raw request body.
    pub fn from_slice(payload: &[u8]) -> ClientResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| Failure::validation(format!("Invalid request body: {e}")))
    }

    /// Check preconditions and produce the immutable invocation request.
    pub fn into_invocation(self) -> ClientResult<InvocationRequest> {
        let input = match self.input {
            Some(RequestInput::Text(text)) if !text.is_empty() => RequestInput::Text(text),
            _ => return Err(Failure::validation(INVALID_INPUT_MESSAGE)),
        };

        let mut request =
            InvocationRequest::new(self.id, self.model_id, input).with_model_type(self.model_type);
        if let Some(parameters) = self.parameters {
            request = request.with_parameters(parameters);
        }
        Ok(request)
    }
}

/// Runs one invocation chain per inbound request and records its outcome.
#[derive(Clone)]
pub struct RequestProcessor {
    client: InferenceClient,
    store: Arc<dyn RecordStore>,
}

impl RequestProcessor {
    pub fn new(client: InferenceClient, store: Arc<dyn RecordStore>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    /// Handle a raw request body and produce the outbound response.
    pub async fn process(&self, payload: &[u8]) -> Response {
        let request = match InboundRequest::from_slice(payload).and_then(|r| r.into_invocation()) {
            Ok(request) => request,
            Err(failure) => {
                tracing::warn!("Rejected request: {}", failure);
                return format_error(&failure);
            }
        };

        format_outcome(&self.invoke(&request).await)
    }

    /// Run a validated request through model validation, generation and
    /// record updates.
    pub async fn invoke(&self, request: &InvocationRequest) -> InvocationOutcome {
        tracing::info!(
            "Processing request {} ({} on {})",
            request.request_id,
            request.model_type,
            request.model_id
        );

        let Some(input) = request.input.as_text() else {
            return Failure::validation(INVALID_INPUT_MESSAGE).into();
        };

        if let Err(failure) = self.client.validate_model(&request.model_id).await {
            tracing::warn!(
                "Request {} rejected by model validation ({}): {}",
                request.request_id,
                failure.status_code,
                failure
            );
            return failure.into();
        }

        if let Err(failure) = self
            .update(&request.request_id, &RecordUpdate::in_progress())
            .await
        {
            tracing::warn!(
                "Request {} could not be marked in progress: {}",
                request.request_id,
                failure
            );
            return failure.into();
        }

        match self.run(request, input).await {
            Ok(success) => success.into(),
            Err(failure) => {
                tracing::warn!(
                    "Request {} failed ({}): {}",
                    request.request_id,
                    failure.status_code,
                    failure
                );
                self.record_failure(&request.request_id, &failure).await;
                failure.into()
            }
        }
    }

    async fn run(&self, request: &InvocationRequest, input: &str) -> ClientResult<Success> {
        let started = Instant::now();
        let output = self
            .client
            .generate(
                request.model_type,
                &request.model_id,
                input,
                request.parameters.as_ref(),
            )
            .await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let success = Success::new(output, elapsed_ms);
        let envelope = serde_json::to_value(SuccessEnvelope::from_success(&success))
            .map_err(|e| Failure::processing(format!("Failed to encode response: {e}")))?;

        self.update(
            &request.request_id,
            &RecordUpdate::completed(envelope, elapsed_ms, success.token_count, Utc::now()),
        )
        .await?;

        tracing::info!(
            "Request {} completed in {}ms",
            request.request_id,
            elapsed_ms
        );
        Ok(success)
    }

    async fn update(&self, id: &str, update: &RecordUpdate) -> ClientResult<()> {
        self.store
            .update_record(id, update)
            .await
            .map_err(|e| Failure::processing(format!("Failed to update request record: {e}")))
    }

    async fn record_failure(&self, id: &str, failure: &Failure) {
        let update = RecordUpdate::error(failure.message.clone(), Utc::now());
        if let Err(e) = self.store.update_record(id, &update).await {
            tracing::error!("Failed to record error for request {}: {}", id, e);
        }
    }
}
