//! Error types for inference invocation
//!
//! Two layers live here. [`Failure`] is the closed taxonomy every caller
//! eventually sees: a kind tag plus the status code reported at the
//! response boundary. [`Error`] is what flows through an invocation chain
//! and may still carry an unclassified lower-level cause; it is turned into
//! a [`Failure`] exactly once, by [`Error::into_failure`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used when a deadline expires.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Kinds of failure a caller can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input or model reference fails a precondition
    Validation,
    /// Remote catalog rejects or cannot locate the referenced model
    Model,
    /// Remote call executed but failed, or something unexpected happened
    Processing,
    /// The operation did not complete within the configured deadline
    Timeout,
}

impl FailureKind {
    /// Status code reported for this kind unless the failure overrides it
    pub fn default_status(self) -> u16 {
        match self {
            FailureKind::Validation => 400,
            FailureKind::Model => 404,
            FailureKind::Processing => 500,
            FailureKind::Timeout => 408,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Model => "model",
            FailureKind::Processing => "processing",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure carrying the status code used at the boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub status_code: u16,
}

impl Failure {
    /// Build a failure with the kind's default status code
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.default_status(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    /// A model failure with the default 404 status
    pub fn model(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Model, message)
    }

    /// A model failure with a caller-supplied status code
    pub fn model_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            kind: FailureKind::Model,
            message: message.into(),
            status_code,
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Processing, message)
    }

    pub fn timeout() -> Self {
        Self::new(FailureKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }
}

/// Errors that can occur while talking to an inference provider
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Already classified; passes through wrapping unchanged
    #[error(transparent)]
    Failure(#[from] Failure),

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Result type for inference operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the taxonomy failure if this error is already classified
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Error::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    /// Returns true if this error is a classified timeout
    pub fn is_timeout(&self) -> bool {
        self.as_failure().is_some_and(Failure::is_timeout)
    }

    /// Classify this error, wrapping anything unclassified as `Processing`.
    ///
    /// Classified failures are returned untouched, so calling this more than
    /// once along a chain never reclassifies a failure.
    pub fn into_failure(self, context: &str) -> Failure {
        match self {
            Error::Failure(failure) => failure,
            other => Failure::processing(format!("{context}: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_codes() {
        assert_eq!(Failure::validation("bad").status_code, 400);
        assert_eq!(Failure::model("missing").status_code, 404);
        assert_eq!(Failure::processing("boom").status_code, 500);
        assert_eq!(Failure::timeout().status_code, 408);
        assert_eq!(Failure::timeout().message, "Request timed out");
    }

    #[test]
    fn test_model_with_custom_status() {
        let failure = Failure::model_with_status("gated", 403);
        assert_eq!(failure.kind, FailureKind::Model);
        assert_eq!(failure.status_code, 403);
    }

    #[test]
    fn test_into_failure_wraps_unclassified() {
        let err = Error::Provider("connection reset".into());
        let failure = err.into_failure("Text generation failed");

        assert_eq!(failure.kind, FailureKind::Processing);
        assert_eq!(failure.status_code, 500);
        assert_eq!(
            failure.message,
            "Text generation failed: Provider error: connection reset"
        );
    }

    #[test]
    fn test_into_failure_is_idempotent() {
        let err = Error::from(Failure::validation("Invalid model type"));
        let failure = err.into_failure("Model validation failed");
        assert_eq!(failure, Failure::validation("Invalid model type"));

        let again = Error::from(failure.clone()).into_failure("outer");
        assert_eq!(again, failure);
    }

    #[test]
    fn test_is_timeout_checks_kind() {
        assert!(Error::from(Failure::timeout()).is_timeout());
        assert!(!Error::from(Failure::processing("Request timed out")).is_timeout());
        assert!(!Error::Provider("timeout".into()).is_timeout());
    }

    #[test]
    fn test_display_uses_message() {
        let err = Error::from(Failure::model("Model not found or inaccessible"));
        assert_eq!(err.to_string(), "Model not found or inaccessible");
    }
}
