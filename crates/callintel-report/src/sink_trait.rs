use crate::emitter::ComparisonReport;
use async_trait::async_trait;
use callintel_core::ReportError;

/// Somewhere a finished [`ComparisonReport`] is persisted.
///
/// Implementations are registered via [`SinkRegistry`](crate::SinkRegistry)
/// and driven by [`ReportPublisher`](crate::ReportPublisher) once per batch.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Returns the sink's plugin name (e.g. `"json_file"`, `"history"`).
    fn name(&self) -> &str;
    /// One-time initialisation with sink-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), ReportError>;
    /// Persist one batch report.
    async fn write_report(&self, report: &ComparisonReport) -> Result<(), ReportError>;
    /// Returns `true` once the sink has somewhere to write.
    fn is_healthy(&self) -> bool;
    async fn shutdown(&self) -> Result<(), ReportError>;
}
