use async_trait::async_trait;
use callintel_core::BackendError;

/// A language-model backend that turns a rendered prompt into raw text.
///
/// Implementations are created through [`BackendRegistry`](crate::BackendRegistry)
/// and driven by [`ModelInvoker`](crate::ModelInvoker), which owns their
/// lifecycle, timeout and latency measurement.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Returns the backend's plugin name (e.g. `"ollama"`, `"reasoning"`).
    fn name(&self) -> &str;
    /// One-time initialisation with backend-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), BackendError>;
    /// Bring model weights into memory. Remote-served models have nothing to load.
    async fn load(&self) -> Result<(), BackendError> {
        Ok(())
    }
    /// Generate the full (non-streamed) completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
    /// Release any resources held by the backend.
    async fn shutdown(&self) -> Result<(), BackendError>;
}
