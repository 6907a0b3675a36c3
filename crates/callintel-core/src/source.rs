use crate::error::SourceError;
use crate::types::{CallSubmission, Transcript};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

/// Supplier of transcripts produced by the upstream speech-to-text step.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Identifiers of every recording the source knows about, sorted.
    async fn list_ids(&self) -> Result<Vec<String>, SourceError>;
    /// Fetch one transcript. Errors abort analysis of that recording only.
    async fn fetch(&self, id: &str) -> Result<CallSubmission, SourceError>;
}

/// Sidecar written next to each recording once it has been transcribed.
#[derive(Debug, Deserialize)]
struct TranscriptSidecar {
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    language_confidence: Option<f64>,
    #[serde(default)]
    duration_seconds: Option<f64>,
    #[serde(default)]
    speaker_label: Option<String>,
    #[serde(default)]
    transcription_status: Option<String>,
}

/// Reads `<dir>/<id>.json` sidecar files.
pub struct SidecarDirectorySource {
    dir: PathBuf,
}

impl SidecarDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn sidecar_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl TranscriptSource for SidecarDirectorySource {
    async fn list_ids(&self) -> Result<Vec<String>, SourceError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn fetch(&self, id: &str) -> Result<CallSubmission, SourceError> {
        let path = self.sidecar_path(id);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;

        let sidecar: TranscriptSidecar =
            serde_json::from_str(&content).map_err(|e| SourceError::Malformed {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(status) = sidecar.transcription_status.as_deref() {
            if !status.eq_ignore_ascii_case("completed") {
                return Err(SourceError::Unavailable(format!(
                    "{id}: transcription_status is '{status}'"
                )));
            }
        }

        let text = sidecar
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SourceError::Unavailable(format!("{id}: empty transcript")))?;

        tracing::debug!(transcript_id = %id, chars = text.len(), "loaded transcript sidecar");

        Ok(CallSubmission {
            id: id.to_string(),
            client_name: sidecar
                .client_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            transcript: Transcript {
                text,
                speaker_label: sidecar.speaker_label.unwrap_or_default(),
                duration_seconds: sidecar.duration_seconds,
                detected_language: sidecar.language_code,
                language_confidence: sidecar.language_confidence,
            },
        })
    }
}
