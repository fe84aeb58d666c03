use modelrelay_inference::provider::huggingface::{DEFAULT_HUB_URL, DEFAULT_INFERENCE_URL};
use modelrelay_inference::retry::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use modelrelay_inference::ClientConfig;
use std::{env, time::Duration};

/// Configuration for the bridge binary.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Inference provider settings.
    pub inference: InferenceConfig,
    /// Record store settings.
    pub store: StoreConfig,
}

impl BridgeConfig {
    /// Builds a configuration from environment variables, falling back to
    /// the defaults the hosted functions use.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            inference: InferenceConfig::from_env()?,
            store: StoreConfig::from_env(),
        })
    }
}

/// Provider credentials, endpoints and retry settings.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_token: String,
    pub hub_url: String,
    pub inference_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl InferenceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_token = env::var("HF_API_TOKEN").unwrap_or_default();
        let hub_url = env::var("HF_HUB_URL").unwrap_or_else(|_| DEFAULT_HUB_URL.into());
        let inference_url =
            env::var("HF_INFERENCE_URL").unwrap_or_else(|_| DEFAULT_INFERENCE_URL.into());
        let timeout_ms = env::var("MODEL_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let max_retries = env::var("MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        anyhow::ensure!(timeout_ms > 0, "MODEL_TIMEOUT must be > 0");

        if api_token.is_empty() {
            tracing::warn!("HF_API_TOKEN is not set; provider requests are unauthenticated");
        }

        Ok(Self {
            api_token,
            hub_url,
            inference_url,
            timeout_ms,
            max_retries,
        })
    }

    /// Client configuration for the inference crate.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_token.clone())
            .with_hub_url(self.hub_url.clone())
            .with_inference_url(self.inference_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_max_retries(self.max_retries)
    }
}

/// Where request records are written.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the REST record store; empty selects the in-memory store.
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("SUPABASE_URL").unwrap_or_default(),
            api_key: env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            table: env::var("MODEL_REQUESTS_TABLE").unwrap_or_else(|_| "model_requests".into()),
        }
    }

    pub fn is_remote(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_carries_settings() {
        let config = InferenceConfig {
            api_token: "hf_token".into(),
            hub_url: "http://hub".into(),
            inference_url: "http://infer".into(),
            timeout_ms: 1500,
            max_retries: 2,
        };

        let client = config.client_config();
        assert_eq!(client.api_token, "hf_token");
        assert_eq!(client.hub_url, "http://hub");
        assert_eq!(client.inference_url, "http://infer");
        assert_eq!(client.timeout, Duration::from_millis(1500));
        assert_eq!(client.max_retries, 2);
    }

    #[test]
    fn test_store_is_remote_only_with_url() {
        let mut store = StoreConfig {
            url: String::new(),
            api_key: String::new(),
            table: "model_requests".into(),
        };
        assert!(!store.is_remote());

        store.url = "https://project.supabase.co".into();
        assert!(store.is_remote());
    }
}
