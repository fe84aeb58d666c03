//! Remote inference provider abstraction

pub mod huggingface;

pub use huggingface::HuggingFaceProvider;

use crate::error::Result;
use crate::types::{GenerationRequest, ModelCatalogEntry};
use async_trait::async_trait;

/// Trait for remote inference providers
///
/// Implementations perform exactly one remote call per method invocation.
/// Deadlines and retries are applied by [`crate::InferenceClient`], never here.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Look up a model in the provider's catalog
    ///
    /// A model the catalog does not know, or refuses to show, is reported as
    /// [`ModelCatalogEntry::missing`] rather than as an error.
    async fn model_info(&self, model_id: &str) -> Result<ModelCatalogEntry>;

    /// Generate text for a prompt
    async fn text_generation(&self, request: &GenerationRequest) -> Result<String>;

    /// Generate an image for a prompt, returning the encoded image bytes
    async fn text_to_image(&self, request: &GenerationRequest) -> Result<Vec<u8>>;
}
