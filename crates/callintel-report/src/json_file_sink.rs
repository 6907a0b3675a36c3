use crate::emitter::ComparisonReport;
use crate::sink_trait::ReportSink;
use async_trait::async_trait;
use callintel_core::ReportError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Writes the full report as pretty JSON, replacing the file on every run.
pub struct JsonFileSink {
    output_path: Option<PathBuf>,
    write_count: AtomicUsize,
}

impl JsonFileSink {
    pub fn new() -> Self {
        Self {
            output_path: None,
            write_count: AtomicUsize::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::Relaxed)
    }
}

impl Default for JsonFileSink {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn path_from_config(config: &toml::Value) -> Result<PathBuf, ReportError> {
    config
        .get("path")
        .and_then(|v| v.as_str())
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ReportError::InitializationFailed("missing 'path' in config".to_string()))
}

pub(crate) async fn ensure_parent(path: &Path) -> Result<(), ReportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ReportError::WriteFailed(format!("{}: {e}", parent.display()))),
        _ => Ok(()),
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    fn name(&self) -> &str {
        "json_file"
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

        let json = report.to_json()?;
        ensure_parent(path).await?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ReportError::WriteFailed(format!("{}: {e}", path.display())))?;

        self.write_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(path = %path.display(), entries = report.entries.len(), "report written");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.output_path.is_some()
    }

    async fn shutdown(&self) -> Result<(), ReportError> {
        Ok(())
    }
}
