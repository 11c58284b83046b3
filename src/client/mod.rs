//! Model client
//!
//! Talks to the relay for the model catalog and text generation. Every call
//! is bounded by the request timeout and every failure turns into mock data,
//! so callers always get something to display.

pub mod mock;

use crate::config::ClientConfig;
use crate::error::{DocchatError, Result};
use crate::liveness::LivenessDetector;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use mock::{mock_catalog, mock_response, MockReason};

/// A model entry from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name, e.g. `llama3.2`
    pub name: String,
    /// Last modification time as reported by the server
    #[serde(default)]
    pub modified_at: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
}

/// Client for the relay API
///
/// # Examples
///
/// ```no_run
/// use docchat::client::ModelClient;
/// use docchat::config::ClientConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = ModelClient::new(&ClientConfig::default())?;
/// let models = client.list_models().await;
/// let reply = client.chat(&models[0].name, "Hello!").await;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModelClient {
    http: Client,
    relay_url: String,
    timeout_seconds: u64,
    detector: LivenessDetector,
}

impl ModelClient {
    /// Create a client with the standard liveness cascade
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be created
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let detector = LivenessDetector::from_config(config)?;
        Self::with_detector(config, detector)
    }

    /// Create a client with a caller-supplied detector
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn with_detector(config: &ClientConfig, detector: LivenessDetector) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DocchatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(relay = %config.relay_url, "Initialized model client");

        Ok(Self {
            http,
            relay_url: config.relay_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.request_timeout_seconds,
            detector,
        })
    }

    /// Relay base URL
    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Whether the model server is reachable (cached once positive)
    pub async fn is_reachable(&self) -> bool {
        self.detector.is_reachable().await
    }

    /// Drop the cached liveness result and probe again
    pub async fn recheck(&self) -> bool {
        self.detector.recheck().await
    }

    /// The liveness detector used by this client
    pub fn detector(&self) -> &LivenessDetector {
        &self.detector
    }

    /// List available models
    ///
    /// Returns the mock catalog when the server is unreachable or the
    /// catalog call fails. Never fails.
    pub async fn list_models(&self) -> Vec<ModelInfo> {
        if !self.is_reachable().await {
            tracing::warn!("Model server unreachable; using mock model catalog");
            return mock_catalog();
        }

        match self.fetch_models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!("Failed to list models, using mock catalog: {}", e);
                mock_catalog()
            }
        }
    }

    /// Fetch the catalog from the relay
    ///
    /// A catalog without a `models` array is an empty list.
    ///
    /// # Errors
    ///
    /// Returns a transport, timeout, upstream or decode error.
    pub async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/tags", self.relay_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DocchatError::from_request(e, self.timeout_seconds))?;
        let response = Self::check_status(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DocchatError::from_request(e, self.timeout_seconds))?;

        match body.get("models") {
            Some(models) if models.is_array() => {
                let models: Vec<ModelInfo> = serde_json::from_value(models.clone())?;
                tracing::debug!(count = models.len(), "Fetched model catalog");
                Ok(models)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Generate a reply
    ///
    /// Falls back to a mock reply when the server is unreachable or the
    /// request fails. Never fails.
    ///
    /// # Arguments
    ///
    /// * `model` - Model name
    /// * `prompt` - Full prompt text
    pub async fn chat(&self, model: &str, prompt: &str) -> String {
        if !self.is_reachable().await {
            tracing::warn!("Model server unreachable; returning mock response");
            return mock_response(MockReason::Unreachable, prompt);
        }

        match self.generate(model, prompt).await {
            Ok(text) => text,
            Err(e) => {
                let reason = match e.downcast_ref::<DocchatError>() {
                    Some(DocchatError::Transport(_))
                    | Some(DocchatError::Timeout { .. })
                    | Some(DocchatError::Upstream { .. }) => MockReason::Unreachable,
                    _ => MockReason::Failure,
                };
                let status = e
                    .downcast_ref::<DocchatError>()
                    .and_then(DocchatError::status_code);
                tracing::warn!(?status, "Generation failed, returning mock response: {}", e);
                mock_response(reason, prompt)
            }
        }
    }

    /// Call the relay's generate endpoint with `stream: false`
    ///
    /// # Errors
    ///
    /// Returns a transport, timeout, upstream or decode error.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/generate", self.relay_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        tracing::debug!(model, prompt_len = prompt.len(), "Sending generate request");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocchatError::from_request(e, self.timeout_seconds))?;
        let response = Self::check_status(response).await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DocchatError::from_request(e, self.timeout_seconds))?;
        Ok(body.response)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RelayErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    text
                }
            });

        Err(DocchatError::Upstream {
            status: status.as_u16(),
            message,
        }
        .into())
    }
}
