//! Model inference invocation for Modelrelay
//!
//! This crate is the core of the request bridge. It provides:
//!
//! - **Error taxonomy**: a closed set of failure kinds, each with the status code
//!   reported to callers
//! - **Timeout guard**: races a remote call against a deadline
//! - **Retry coordinator**: bounded, sequential retry that never retries a timeout
//! - **Inference client**: model validation plus text and image generation
//! - **Response formatting**: success and error envelopes
//!
//! # Example
//!
//! ```rust,ignore
//! use modelrelay_inference::{ClientConfig, InferenceClient};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("hf_xxx")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_max_retries(3);
//! let client = InferenceClient::huggingface(&config)?;
//!
//! client.validate_model("openai-community/gpt2").await?;
//! let generation = client.text_to_text("openai-community/gpt2", "Hello", None).await?;
//! println!("{}", generation.text);
//! ```
//!
//! # Modules
//!
//! - [`client`]: inference client and its configuration
//! - [`error`]: failure taxonomy and in-chain errors
//! - [`params`]: default generation parameters and overrides
//! - [`provider`]: remote provider trait and the Hugging Face implementation
//! - [`response`]: outbound envelopes
//! - [`retry`]: retry policy and coordinator
//! - [`timeout`]: deadline guard
//! - [`types`]: requests, outcomes, catalog entries

pub mod client;
pub mod error;
pub mod params;
pub mod provider;
pub mod response;
pub mod retry;
pub mod timeout;
pub mod types;

// Re-export commonly used types
pub use client::{ClientConfig, ClientResult, InferenceClient};
pub use error::{Error, Failure, FailureKind, Result};
pub use params::{merge_parameters, text_generation_defaults, text_to_image_defaults};
pub use provider::{HuggingFaceProvider, InferenceProvider};
pub use response::{
    format_error, format_outcome, format_success, ErrorEnvelope, Response, SuccessEnvelope,
};
pub use retry::{with_retry, RetryPolicy};
pub use timeout::with_timeout;
pub use types::{
    GeneratedOutput, GenerationRequest, ImageGeneration, InvocationOutcome, InvocationRequest,
    ModelCatalogEntry, ModelType, Parameters, RequestInput, Success, TextGeneration,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{ClientConfig, InferenceClient};
    pub use crate::error::{Error, Failure, FailureKind, Result};
    pub use crate::provider::InferenceProvider;
    pub use crate::response::{format_outcome, Response};
    pub use crate::retry::RetryPolicy;
    pub use crate::types::{GeneratedOutput, InvocationOutcome, InvocationRequest, ModelType};
}
