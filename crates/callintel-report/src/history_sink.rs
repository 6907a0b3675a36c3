use crate::emitter::ComparisonReport;
use crate::json_file_sink::{ensure_parent, path_from_config};
use crate::sink_trait::ReportSink;
use async_trait::async_trait;
use callintel_core::ReportError;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Appends one JSON line per run holding only the report summary, so
/// results can be tracked across runs.
pub struct HistorySink {
    output_path: Option<PathBuf>,
}

impl HistorySink {
    pub fn new() -> Self {
        Self { output_path: None }
    }
}

impl Default for HistorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportSink for HistorySink {
    fn name(&self) -> &str {
        "history"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), ReportError> {
        self.output_path = Some(path_from_config(&config)?);
        Ok(())
    }

    async fn write_report(&self, report: &ComparisonReport) -> Result<(), ReportError> {
        let path = self
            .output_path
            .as_ref()
            .ok_or_else(|| ReportError::WriteFailed("not initialized".to_string()))?;

        let mut line = serde_json::to_string(&report.summary)?;
        line.push('\n');

        ensure_parent(path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| ReportError::WriteFailed(format!("{}: {e}", path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ReportError::WriteFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| ReportError::WriteFailed(e.to_string()))?;

        tracing::debug!(path = %path.display(), "history line appended");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.output_path.is_some()
    }

    async fn shutdown(&self) -> Result<(), ReportError> {
        Ok(())
    }
}
