use crate::backend_trait::ModelBackend;
use crate::lifecycle::ModelLifecycle;
use crate::registry::BackendRegistry;
use callintel_core::{BackendError, BackendId, InvocationError, RawModelResponse};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct BackendSlot {
    plugin: String,
    backend: Arc<dyn ModelBackend>,
    lifecycle: Arc<ModelLifecycle>,
    timeout: Duration,
}

/// Sends prompts to registered backends and converts every outcome, including
/// transport failures and timeouts, into a [`RawModelResponse`].
pub struct ModelInvoker {
    slots: HashMap<BackendId, BackendSlot>,
}

impl ModelInvoker {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Create `plugin` from the registry, initialise it and register it under `id`.
    /// The model starts `Unloaded`; call [`load_all`](Self::load_all) before invoking.
    pub async fn add_backend(
        &mut self,
        id: BackendId,
        plugin: &str,
        timeout: Duration,
        config: toml::Value,
        registry: &BackendRegistry,
    ) -> Result<(), BackendError> {
        let mut backend = registry.create(plugin)?;
        backend.initialize(config).await?;
        self.insert(id, backend, ModelLifecycle::new(), timeout);
        Ok(())
    }

    /// Register an already-initialised backend with an explicit lifecycle.
    pub fn insert(
        &mut self,
        id: BackendId,
        backend: Box<dyn ModelBackend>,
        lifecycle: ModelLifecycle,
        timeout: Duration,
    ) {
        let plugin = backend.name().to_string();
        self.slots.insert(
            id,
            BackendSlot {
                plugin,
                backend: Arc::from(backend),
                lifecycle: Arc::new(lifecycle),
                timeout,
            },
        );
    }

    pub fn backend_ids(&self) -> Vec<BackendId> {
        let mut ids: Vec<BackendId> = self.slots.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn lifecycle(&self, id: BackendId) -> Option<Arc<ModelLifecycle>> {
        self.slots.get(&id).map(|slot| Arc::clone(&slot.lifecycle))
    }

    /// Load every unloaded model concurrently. Each load is bounded by the
    /// backend's timeout; failures leave that lifecycle in `Failed` and do not
    /// affect the others.
    pub async fn load_all(&self) {
        let mut tasks = tokio::task::JoinSet::new();
        for (id, slot) in &self.slots {
            if !slot.lifecycle.begin_loading() {
                continue;
            }
            let id = *id;
            let backend = Arc::clone(&slot.backend);
            let lifecycle = Arc::clone(&slot.lifecycle);
            let timeout = slot.timeout;
            let plugin = slot.plugin.clone();

            tasks.spawn(async move {
                tracing::info!(backend = %id, plugin = %plugin, "loading model");
                let start = Instant::now();
                match tokio::time::timeout(timeout, backend.load()).await {
                    Ok(Ok(())) => {
                        lifecycle.mark_ready();
                        tracing::info!(
                            backend = %id,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "model ready"
                        );
                    }
                    Ok(Err(e)) => {
                        tracing::error!(backend = %id, "model load failed: {e}");
                        lifecycle.mark_failed(e.to_string());
                    }
                    Err(_) => {
                        tracing::error!(backend = %id, "model load timed out after {timeout:?}");
                        lifecycle.mark_failed(format!("load timed out after {timeout:?}"));
                    }
                }
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    /// Send `prompt` to backend `id`. Never fails: every error is folded into
    /// the returned response.
    pub async fn invoke(&self, id: BackendId, prompt: &str) -> RawModelResponse {
        let Some(slot) = self.slots.get(&id) else {
            return RawModelResponse::failure(
                id,
                InvocationError::ModelUnavailable(format!("backend '{id}' is not registered")),
                0.0,
            );
        };

        if let Err(e) = slot.lifecycle.check_ready() {
            tracing::warn!(backend = %id, "skipping invocation: {e}");
            return RawModelResponse::failure(id, e.into(), 0.0);
        }

        let start = Instant::now();
        let outcome = tokio::time::timeout(slot.timeout, slot.backend.generate(prompt)).await;
        let latency = start.elapsed().as_secs_f64();

        match outcome {
            Ok(Ok(text)) => {
                tracing::debug!(
                    backend = %id,
                    latency_seconds = latency,
                    chars = text.len(),
                    "backend responded"
                );
                RawModelResponse::success(id, text, latency)
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = %id, latency_seconds = latency, "invocation failed: {e}");
                RawModelResponse::failure(id, e.into(), latency)
            }
            Err(_) => {
                tracing::warn!(backend = %id, "invocation timed out after {:?}", slot.timeout);
                RawModelResponse::failure(id, InvocationError::Timeout(slot.timeout.as_millis() as u64), latency)
            }
        }
    }

    pub async fn shutdown(&self) {
        for (id, slot) in &self.slots {
            if let Err(e) = slot.backend.shutdown().await {
                tracing::warn!(backend = %id, "shutdown failed: {e}");
            }
        }
    }
}

impl Default for ModelInvoker {
    fn default() -> Self {
        Self::new()
    }
}
