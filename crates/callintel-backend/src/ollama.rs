//! Fast backend served by a local Ollama runtime.
//!
//! Connects to a running Ollama server (default: localhost:11434) and uses the
//! non-streaming `/api/generate` endpoint.

use crate::backend_trait::ModelBackend;
use async_trait::async_trait;
use callintel_core::BackendError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
struct OllamaConfig {
    #[serde(default = "default_endpoint")]
    endpoint: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

pub struct OllamaBackend {
    client: Client,
    config: Option<OllamaConfig>,
}

impl OllamaBackend {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            config: None,
        }
    }

    fn api_url(endpoint: &str, path: &str) -> String {
        format!("{}/api{}", endpoint.trim_end_matches('/'), path)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), BackendError> {
        let config: OllamaConfig = config
            .try_into()
            .map_err(|e| BackendError::InitializationFailed(format!("ollama config: {e}")))?;
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(BackendError::InitializationFailed(format!(
                "ollama endpoint must be an http(s) URL, got '{}'",
                config.endpoint
            )));
        }

        tracing::info!(
            endpoint = %config.endpoint,
            model = %config.model,
            "OllamaBackend initialized"
        );
        self.config = Some(config);
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| BackendError::InitializationFailed("not initialized".to_string()))?;

        let request = OllamaGenerateRequest {
            model: &config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: config.temperature,
            },
        };

        let response = self
            .client
            .post(Self::api_url(&config.endpoint, "/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedBody(e.to_string()))?;
        Ok(body.response)
    }

    async fn shutdown(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
