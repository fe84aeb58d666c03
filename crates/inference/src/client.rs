//! Inference client: model validation and generation through retry

use crate::error::{Error, Failure};
use crate::params::{merge_parameters, text_generation_defaults, text_to_image_defaults};
use crate::provider::huggingface::{DEFAULT_HUB_URL, DEFAULT_INFERENCE_URL};
use crate::provider::{HuggingFaceProvider, InferenceProvider};
use crate::retry::{with_retry, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::types::{
    GeneratedOutput, GenerationRequest, ImageGeneration, ModelType, Parameters, TextGeneration,
};
use std::sync::Arc;
use std::time::Duration;

/// Result type returned at the client boundary
pub type ClientResult<T> = std::result::Result<T, Failure>;

pub const MODEL_NOT_FOUND_MESSAGE: &str = "Model not found or inaccessible";
pub const INVALID_MODEL_TYPE_MESSAGE: &str = "Invalid model type";

/// Configuration for an inference client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API token for the provider
    pub api_token: String,
    /// Model catalog base URL
    pub hub_url: String,
    /// Generation endpoint base URL
    pub inference_url: String,
    /// Deadline for each generation attempt
    pub timeout: Duration,
    /// Maximum retries after the first attempt
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with the specified API token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    /// Set the API token
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = api_token.into();
        self
    }

    /// Set the model catalog base URL
    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into();
        self
    }

    /// Set the generation base URL
    pub fn with_inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the retry policy, rejecting a zero timeout
    pub fn retry_policy(&self) -> ClientResult<RetryPolicy> {
        RetryPolicy::new(self.max_retries, self.timeout)
    }
}

/// Validates models and runs generation calls against a provider
///
/// The client holds only read-only state (provider handle and retry
/// policy), so one instance can serve concurrent invocation chains.
#[derive(Clone)]
pub struct InferenceClient {
    provider: Arc<dyn InferenceProvider>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for InferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceClient")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl InferenceClient {
    pub fn new(provider: Arc<dyn InferenceProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Build a client talking to Hugging Face with the given configuration
    pub fn huggingface(config: &ClientConfig) -> ClientResult<Self> {
        let policy = config.retry_policy()?;
        let provider = HuggingFaceProvider::new(config.api_token.clone())
            .with_hub_url(config.hub_url.clone())
            .with_inference_url(config.inference_url.clone());
        Ok(Self::new(Arc::new(provider), policy))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Check that a model exists and carries a pipeline classification.
    ///
    /// This is a single lookup with no retry and no deadline of its own.
    pub async fn validate_model(&self, model_id: &str) -> ClientResult<()> {
        if model_id.trim().is_empty() {
            return Err(Failure::validation("Model id must not be empty"));
        }

        let entry = self
            .provider
            .model_info(model_id)
            .await
            .map_err(|e| e.into_failure("Model validation failed"))?;

        if !entry.exists {
            return Err(Failure::model(MODEL_NOT_FOUND_MESSAGE));
        }

        match entry.classification() {
            Some(tag) => {
                tracing::debug!("Model {} validated with pipeline {}", model_id, tag);
                Ok(())
            }
            None => Err(Failure::validation(INVALID_MODEL_TYPE_MESSAGE)),
        }
    }

    /// Generate text, merging `parameters` over the text defaults
    pub async fn text_to_text(
        &self,
        model_id: &str,
        input: &str,
        parameters: Option<&Parameters>,
    ) -> ClientResult<TextGeneration> {
        let request = GenerationRequest {
            model: model_id.to_string(),
            inputs: input.to_string(),
            parameters: merge_parameters(text_generation_defaults(), parameters),
        };

        let provider = &self.provider;
        let text = with_retry(&self.policy, "text generation", || {
            provider.text_generation(&request)
        })
        .await
        .map_err(|e| wrap_generation_error(e, "Text generation failed"))?;

        Ok(TextGeneration { text })
    }

    /// Generate an image, merging `parameters` over the image defaults
    pub async fn text_to_image(
        &self,
        model_id: &str,
        prompt: &str,
        parameters: Option<&Parameters>,
    ) -> ClientResult<ImageGeneration> {
        let request = GenerationRequest {
            model: model_id.to_string(),
            inputs: prompt.to_string(),
            parameters: merge_parameters(text_to_image_defaults(), parameters),
        };

        let provider = &self.provider;
        let binary = with_retry(&self.policy, "image generation", || {
            provider.text_to_image(&request)
        })
        .await
        .map_err(|e| wrap_generation_error(e, "Image generation failed"))?;

        Ok(ImageGeneration { binary })
    }

    /// Run the generation operation a model type calls for
    pub async fn generate(
        &self,
        model_type: ModelType,
        model_id: &str,
        input: &str,
        parameters: Option<&Parameters>,
    ) -> ClientResult<GeneratedOutput> {
        match model_type {
            ModelType::TextToText => self
                .text_to_text(model_id, input, parameters)
                .await
                .map(GeneratedOutput::from),
            ModelType::TextToImage => self
                .text_to_image(model_id, input, parameters)
                .await
                .map(GeneratedOutput::from),
        }
    }
}

fn wrap_generation_error(err: Error, context: &str) -> Failure {
    let failure = err.into_failure(context);
    tracing::debug!("{} ({}): {}", context, failure.kind, failure.message);
    failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("hf_xxx")
            .with_hub_url("http://localhost:9000")
            .with_inference_url("http://localhost:9001")
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1);

        assert_eq!(config.api_token, "hf_xxx");
        assert_eq!(config.hub_url, "http://localhost:9000");
        assert_eq!(config.inference_url, "http://localhost:9001");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.hub_url, "https://huggingface.co");
    }

    #[test]
    fn test_zero_timeout_rejected_at_construction() {
        let config = ClientConfig::new("hf_xxx").with_timeout(Duration::ZERO);
        let err = InferenceClient::huggingface(&config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Validation);
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn test_huggingface_client_uses_configured_policy() {
        let config = ClientConfig::new("hf_xxx").with_max_retries(7);
        let client = InferenceClient::huggingface(&config).unwrap();
        assert_eq!(client.policy().max_retries(), 7);
        assert_eq!(client.provider_name(), "huggingface");
    }
}
