//! Core types for model invocation

use crate::error::Failure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tunable generation parameters, keyed by provider parameter name
pub type Parameters = serde_json::Map<String, serde_json::Value>;

/// Kind of generation a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    #[default]
    TextToText,
    TextToImage,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::TextToText => "text-to-text",
            ModelType::TextToImage => "text-to-image",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input payload of a request: plain text or a structured object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestInput {
    Text(String),
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl RequestInput {
    /// The text content, if this is a text input
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestInput::Text(text) => Some(text),
            RequestInput::Structured(_) => None,
        }
    }
}

impl From<&str> for RequestInput {
    fn from(text: &str) -> Self {
        RequestInput::Text(text.to_string())
    }
}

impl From<String> for RequestInput {
    fn from(text: String) -> Self {
        RequestInput::Text(text)
    }
}

/// A single model invocation, immutable once received
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub request_id: String,
    pub model_id: String,
    pub input: RequestInput,
    pub model_type: ModelType,
    pub parameters: Option<Parameters>,
}

impl InvocationRequest {
    /// Create a text-to-text request without parameter overrides
    pub fn new(
        request_id: impl Into<String>,
        model_id: impl Into<String>,
        input: impl Into<RequestInput>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            model_id: model_id.into(),
            input: input.into(),
            model_type: ModelType::default(),
            parameters: None,
        }
    }

    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Body sent to a provider generation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Remote model identifier
    pub model: String,
    /// Prompt or input text
    pub inputs: String,
    /// Effective parameters after merging caller overrides onto defaults
    pub parameters: Parameters,
}

/// Catalog descriptor for a remote model, fetched fresh on every lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelCatalogEntry {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_tag: Option<String>,
}

impl ModelCatalogEntry {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn found(pipeline_tag: Option<String>) -> Self {
        Self {
            exists: true,
            pipeline_tag,
        }
    }

    /// The classification tag, treating an empty tag as absent
    pub fn classification(&self) -> Option<&str> {
        self.pipeline_tag.as_deref().filter(|tag| !tag.trim().is_empty())
    }
}

/// Result of a text generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextGeneration {
    pub text: String,
}

/// Result of an image generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGeneration {
    pub binary: Vec<u8>,
}

/// Generated payload of a successful invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedOutput {
    Text(String),
    Binary(Vec<u8>),
}

impl GeneratedOutput {
    /// Whitespace-separated word count of text output; `None` for binary
    pub fn token_count(&self) -> Option<u64> {
        match self {
            GeneratedOutput::Text(text) => Some(text.split_whitespace().count() as u64),
            GeneratedOutput::Binary(_) => None,
        }
    }
}

impl From<TextGeneration> for GeneratedOutput {
    fn from(generation: TextGeneration) -> Self {
        GeneratedOutput::Text(generation.text)
    }
}

impl From<ImageGeneration> for GeneratedOutput {
    fn from(generation: ImageGeneration) -> Self {
        GeneratedOutput::Binary(generation.binary)
    }
}

/// Successful outcome of an invocation chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    pub output: GeneratedOutput,
    pub elapsed_ms: u64,
    pub token_count: Option<u64>,
}

impl Success {
    /// Build a success, deriving the token count from the output
    pub fn new(output: GeneratedOutput, elapsed_ms: u64) -> Self {
        let token_count = output.token_count();
        Self {
            output,
            elapsed_ms,
            token_count,
        }
    }
}

/// Terminal value of one invocation chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success(Success),
    Failure(Failure),
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success(_))
    }

    /// Status code this outcome reports at the boundary
    pub fn status_code(&self) -> u16 {
        match self {
            InvocationOutcome::Success(_) => 200,
            InvocationOutcome::Failure(failure) => failure.status_code,
        }
    }
}

impl From<Failure> for InvocationOutcome {
    fn from(failure: Failure) -> Self {
        InvocationOutcome::Failure(failure)
    }
}

impl From<Success> for InvocationOutcome {
    fn from(success: Success) -> Self {
        InvocationOutcome::Success(success)
    }
}
