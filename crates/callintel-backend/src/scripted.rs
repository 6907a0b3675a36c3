use crate::backend_trait::ModelBackend;
use async_trait::async_trait;
use callintel_core::BackendError;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
struct ScriptedConfig {
    #[serde(default)]
    response: String,
    #[serde(default)]
    delay_ms: u64,
    #[serde(default)]
    fail_with: Option<String>,
    #[serde(default)]
    unavailable: bool,
}

/// Deterministic backend that replays a canned response. Used for dry runs
/// and as the stand-in for real models in tests.
pub struct ScriptedBackend {
    script: ScriptedConfig,
    call_count: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            script: ScriptedConfig {
                response: response.into(),
                ..ScriptedConfig::default()
            },
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay_ms = delay.as_millis() as u64;
        self
    }

    /// Every call fails with a transport error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.script.fail_with = Some(message.into());
        self
    }

    /// Loading always fails, leaving the lifecycle in `Failed`.
    pub fn unavailable(mut self) -> Self {
        self.script.unavailable = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), BackendError> {
        self.script = config
            .try_into()
            .map_err(|e| BackendError::InitializationFailed(format!("scripted config: {e}")))?;
        Ok(())
    }

    async fn load(&self) -> Result<(), BackendError> {
        if self.script.unavailable {
            return Err(BackendError::ModelUnavailable(
                "scripted backend marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let count = self.call_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("ScriptedBackend call #{count}, prompt {} chars", prompt.len());

        if self.script.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.script.delay_ms)).await;
        }
        if let Some(message) = &self.script.fail_with {
            return Err(BackendError::Transport(message.clone()));
        }
        Ok(self.script.response.clone())
    }

    async fn shutdown(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
