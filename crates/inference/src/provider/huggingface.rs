//! Hugging Face Hub and Inference API provider

use crate::error::{Error, Result};
use crate::provider::InferenceProvider;
use crate::types::{GenerationRequest, ModelCatalogEntry};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// Default base URL of the model catalog
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Default base URL of the hosted inference endpoints
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

/// Hugging Face provider over HTTP
///
/// Model lookups go to the Hub catalog (`GET {hub}/api/models/{id}`) and
/// generation goes to the hosted Inference API
/// (`POST {inference}/models/{id}`). Every request carries the API token as
/// a bearer credential.
///
/// # Example
///
/// ```no_run
/// use modelrelay_inference::provider::{HuggingFaceProvider, InferenceProvider};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = HuggingFaceProvider::new("hf_xxx");
/// let entry = provider.model_info("openai-community/gpt2").await?;
/// println!("pipeline: {:?}", entry.pipeline_tag);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    client: Client,
    api_token: String,
    hub_url: String,
    inference_url: String,
}

impl HuggingFaceProvider {
    /// Create a provider against the public Hugging Face endpoints
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_token: api_token.into(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
        }
    }

    /// Set the catalog base URL
    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the inference base URL
    pub fn with_inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn hub_url(&self) -> &str {
        &self.hub_url
    }

    pub fn inference_url(&self) -> &str {
        &self.inference_url
    }

    fn model_url(&self, model_id: &str) -> String {
        format!("{}/api/models/{}", self.hub_url, model_id)
    }

    fn generation_url(&self, model_id: &str) -> String {
        format!("{}/models/{}", self.inference_url, model_id)
    }

    async fn post_generation(&self, request: &GenerationRequest) -> Result<Response> {
        let body = InferencePayload {
            inputs: &request.inputs,
            parameters: &request.parameters,
        };

        let response = self
            .client
            .post(self.generation_url(&request.model))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        ensure_success(response).await
    }
}

#[async_trait]
impl InferenceProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn model_info(&self, model_id: &str) -> Result<ModelCatalogEntry> {
        let response = self
            .client
            .get(self.model_url(model_id))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(
                "Catalog lookup for {} returned status {}",
                model_id,
                response.status()
            );
            return Ok(ModelCatalogEntry::missing());
        }

        let info: HubModelInfo = response.json().await?;
        Ok(ModelCatalogEntry::found(info.pipeline_tag))
    }

    async fn text_generation(&self, request: &GenerationRequest) -> Result<String> {
        let response = self.post_generation(request).await?;
        let bytes = response.bytes().await?;
        parse_generated_text(&bytes)
    }

    async fn text_to_image(&self, request: &GenerationRequest) -> Result<Vec<u8>> {
        let response = self.post_generation(request).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Provider("Image generation returned no data".into()));
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: &'a crate::types::Parameters,
}

#[derive(Deserialize)]
struct HubModelInfo {
    #[serde(default)]
    pipeline_tag: Option<String>,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

/// Extract generated text from either the batched or the single-object
/// response shape.
fn parse_generated_text(bytes: &[u8]) -> Result<String> {
    match serde_json::from_slice::<TextGenerationResponse>(bytes)? {
        TextGenerationResponse::Single(generated) => Ok(generated.generated_text),
        TextGenerationResponse::Batch(batch) => batch
            .into_iter()
            .next()
            .map(|generated| generated.generated_text)
            .ok_or_else(|| Error::Provider("Text generation returned no results".into())),
    }
}
