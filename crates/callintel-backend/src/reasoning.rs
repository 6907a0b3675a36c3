//! Deep-reasoning backend running on a local inference server.
//!
//! The server keeps model weights resident between calls, so weights are
//! loaded once through `/load` and every analysis goes through `/generate`.

use crate::backend_trait::ModelBackend;
use async_trait::async_trait;
use callintel_core::BackendError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
struct ReasoningConfig {
    #[serde(default = "default_endpoint")]
    endpoint: String,
    model: String,
    #[serde(default = "default_max_new_tokens")]
    max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    temperature: f32,
    #[serde(default = "default_true")]
    do_sample: bool,
    #[serde(default = "default_top_p")]
    top_p: f32,
}

fn default_endpoint() -> String {
    "http://localhost:8765".to_string()
}

fn default_max_new_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_top_p() -> f32 {
    0.9
}

#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    loaded: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

pub struct ReasoningBackend {
    client: Client,
    config: Option<ReasoningConfig>,
}

impl ReasoningBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            config: None,
        }
    }

    fn config(&self) -> Result<&ReasoningConfig, BackendError> {
        self.config
            .as_ref()
            .ok_or_else(|| BackendError::InitializationFailed("not initialized".to_string()))
    }

    fn url(endpoint: &str, path: &str) -> String {
        format!("{}{}", endpoint.trim_end_matches('/'), path)
    }

    /// The server answers 503 while weights are not resident.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(BackendError::ModelUnavailable(body));
        }
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl Default for ReasoningBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelBackend for ReasoningBackend {
    fn name(&self) -> &str {
        "reasoning"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), BackendError> {
        if config.get("model").and_then(|v| v.as_str()).is_none() {
            return Err(BackendError::InitializationFailed(
                "missing 'model' in reasoning config".to_string(),
            ));
        }
        let config: ReasoningConfig = config
            .try_into()
            .map_err(|e| BackendError::InitializationFailed(format!("reasoning config: {e}")))?;

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            max_new_tokens = config.max_new_tokens,
            "ReasoningBackend initialized (model not loaded yet)"
        );
        self.config = Some(config);
        Ok(())
    }

    async fn load(&self) -> Result<(), BackendError> {
        let config = self.config()?;
        let response = self
            .client
            .post(Self::url(&config.endpoint, "/load"))
            .json(&LoadRequest {
                model: &config.model,
            })
            .send()
            .await
            .map_err(|e| BackendError::ModelUnavailable(format!("inference server unreachable: {e}")))?;

        let body: LoadResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedBody(e.to_string()))?;

        if !body.loaded {
            return Err(BackendError::ModelUnavailable(
                body.error.unwrap_or_else(|| format!("{} failed to load", config.model)),
            ));
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let config = self.config()?;
        let request = GenerateRequest {
            model: &config.model,
            prompt,
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            do_sample: config.do_sample,
            top_p: config.top_p,
        };

        let response = self
            .client
            .post(Self::url(&config.endpoint, "/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let body: GenerateResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedBody(e.to_string()))?;
        Ok(body.text)
    }

    async fn shutdown(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
