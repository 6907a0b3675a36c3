use crate::engine::ComparisonEngine;
use callintel_core::{BackendId, ReportEntry, SourceError, TranscriptSource};
use std::sync::Arc;

/// Drives the comparison engine over a batch of transcripts. Every requested
/// id yields exactly one [`ReportEntry`], in submission order.
pub struct BatchRunner {
    source: Arc<dyn TranscriptSource>,
    engine: ComparisonEngine,
    backends: Vec<BackendId>,
}

impl BatchRunner {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        engine: ComparisonEngine,
        backends: Vec<BackendId>,
    ) -> Self {
        Self {
            source,
            engine,
            backends,
        }
    }

    /// Compare every transcript the source lists.
    pub async fn run_all(&self) -> Result<Vec<ReportEntry>, SourceError> {
        let ids = self.source.list_ids().await?;
        Ok(self.run(&ids).await)
    }

    pub async fn run(&self, ids: &[String]) -> Vec<ReportEntry> {
        let total = ids.len();
        let mut entries = Vec::with_capacity(total);

        for (index, id) in ids.iter().enumerate() {
            tracing::info!(transcript = %id, "comparing {}/{total}", index + 1);

            let submission = match self.source.fetch(id).await {
                Ok(submission) => submission,
                Err(e) => {
                    tracing::warn!(transcript = %id, "skipping: {e}");
                    entries.push(ReportEntry::Skipped {
                        transcript_id: id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.engine.compare(&submission, &self.backends).await {
                Ok(result) => entries.push(ReportEntry::Compared(result)),
                Err(e) => {
                    tracing::warn!(transcript = %id, "skipping: {e}");
                    entries.push(ReportEntry::Skipped {
                        transcript_id: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        entries
    }
}
