//! Outbound result envelopes

use crate::error::Failure;
use crate::types::{GeneratedOutput, InvocationOutcome, Success};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned for a successful invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope {
    /// Generated text, or base64 of generated binary data
    pub output: String,
    pub processing_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    pub status: EnvelopeStatus,
}

/// Envelope returned for a failed invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status: EnvelopeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// A formatted response: transport status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub body: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl SuccessEnvelope {
    pub fn from_success(success: &Success) -> Self {
        let output = match &success.output {
            GeneratedOutput::Text(text) => text.clone(),
            GeneratedOutput::Binary(bytes) => {
                base64::engine::general_purpose::STANDARD.encode(bytes)
            }
        };

        Self {
            output,
            processing_time: success.elapsed_ms,
            token_count: success.token_count,
            status: EnvelopeStatus::Success,
        }
    }
}

impl ErrorEnvelope {
    pub fn from_failure(failure: &Failure) -> Self {
        Self {
            error: failure.message.clone(),
            status: EnvelopeStatus::Error,
        }
    }
}

pub fn format_success(success: &Success) -> Response {
    Response {
        status_code: 200,
        body: to_body(&SuccessEnvelope::from_success(success)),
    }
}

pub fn format_error(failure: &Failure) -> Response {
    Response {
        status_code: failure.status_code,
        body: to_body(&ErrorEnvelope::from_failure(failure)),
    }
}

pub fn format_outcome(outcome: &InvocationOutcome) -> Response {
    match outcome {
        InvocationOutcome::Success(success) => format_success(success),
        InvocationOutcome::Failure(failure) => format_error(failure),
    }
}

fn to_body<T: Serialize>(envelope: &T) -> Value {
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let success = Success::new(GeneratedOutput::Text("Hello there".into()), 12);
        let response = format_success(&success);

        assert_eq!(response.status_code, 200);
        assert!(response.is_success());
        assert_eq!(
            response.body,
            json!({
                "output": "Hello there",
                "processingTime": 12,
                "tokenCount": 2,
                "status": "success"
            })
        );
    }

    #[test]
    fn test_binary_output_is_base64_without_token_count() {
        let success = Success::new(GeneratedOutput::Binary(vec![0x89, b'P', b'N', b'G']), 3);
        let response = format_success(&success);

        assert_eq!(response.body["output"], "iVBORw==");
        assert!(response.body.get("tokenCount").is_none());
    }

    #[test]
    fn test_error_envelope_uses_failure_status() {
        let response = format_error(&Failure::model("Model not found or inaccessible"));

        assert_eq!(response.status_code, 404);
        assert!(!response.is_success());
        assert_eq!(
            response.body,
            json!({"error": "Model not found or inaccessible", "status": "error"})
        );
    }

    #[test]
    fn test_format_outcome_dispatches() {
        let timeout = InvocationOutcome::from(Failure::timeout());
        let response = format_outcome(&timeout);
        assert_eq!(response.status_code, 408);
        assert_eq!(response.body["error"], "Request timed out");
    }
}
