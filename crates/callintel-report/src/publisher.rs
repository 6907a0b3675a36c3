use crate::emitter::ComparisonReport;
use crate::registry::SinkRegistry;
use crate::sink_trait::ReportSink;
use callintel_core::ReportError;

/// Fans a finished report out to every configured sink. This is the single
/// writer at the end of a batch.
pub struct ReportPublisher {
    registry: SinkRegistry,
    sinks: Vec<Box<dyn ReportSink>>,
}

impl ReportPublisher {
    pub fn new() -> Self {
        Self::with_registry(SinkRegistry::new())
    }

    pub fn with_registry(registry: SinkRegistry) -> Self {
        Self {
            registry,
            sinks: Vec::new(),
        }
    }

    pub async fn add_sink(&mut self, plugin: &str, config: toml::Value) -> Result<(), ReportError> {
        let mut sink = self.registry.create(plugin)?;
        sink.initialize(config).await?;
        tracing::debug!(sink = plugin, "report sink added");
        self.sinks.push(sink);
        Ok(())
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Write to every sink. A failing sink does not stop the others; the
    /// first error is returned after all have been tried.
    pub async fn publish(&self, report: &ComparisonReport) -> Result<(), ReportError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.write_report(report).await {
                tracing::error!(sink = sink.name(), "report write failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub async fn shutdown(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.shutdown().await {
                tracing::warn!(sink = sink.name(), "shutdown failed: {e}");
            }
        }
    }
}

impl Default for ReportPublisher {
    fn default() -> Self {
        Self::new()
    }
}
