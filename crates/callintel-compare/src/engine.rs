use crate::scoring::{BackendOutcome, Scorer};
use callintel_backend::ModelInvoker;
use callintel_core::{
    BackendId, CallSubmission, CompareError, ComparisonConfig, ComparisonResult, InvocationError,
    PromptBuilder, RawModelResponse,
};
use callintel_extract::StructuredExtractor;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Runs one transcript through several backends concurrently and scores the
/// results.
pub struct ComparisonEngine {
    invoker: Arc<ModelInvoker>,
    extractor: Arc<StructuredExtractor>,
    prompts: PromptBuilder,
    scorer: Scorer,
    deadline: Duration,
}

impl ComparisonEngine {
    pub fn new(
        invoker: Arc<ModelInvoker>,
        extractor: Arc<StructuredExtractor>,
        config: &ComparisonConfig,
    ) -> Self {
        Self {
            invoker,
            extractor,
            prompts: PromptBuilder::new(),
            scorer: Scorer::new(config.clone()),
            deadline: config.overall_deadline(),
        }
    }

    /// Fan out to `backends`, one task each, and join under the overall
    /// deadline. Tasks still running at the deadline are aborted and recorded
    /// as timeouts. Fails only when no backend was requested or every
    /// requested backend reported its model unavailable.
    pub async fn compare(
        &self,
        submission: &CallSubmission,
        backends: &[BackendId],
    ) -> Result<ComparisonResult, CompareError> {
        let requested: BTreeSet<BackendId> = backends.iter().copied().collect();
        if requested.is_empty() {
            return Err(CompareError::NoBackends);
        }

        let start = Instant::now();
        let deadline = start + self.deadline;
        let mut tasks = JoinSet::new();

        for &backend in &requested {
            let prompt = self
                .prompts
                .build(&submission.transcript, &submission.client_name, backend);
            let invoker = Arc::clone(&self.invoker);
            let extractor = Arc::clone(&self.extractor);

            tasks.spawn(async move {
                let response = invoker.invoke(backend, &prompt).await;
                let record = response
                    .succeeded
                    .then(|| extractor.extract(&response.raw_text));
                BackendOutcome { response, record }
            });
        }

        let mut outcomes: BTreeMap<BackendId, BackendOutcome> = BTreeMap::new();
        let mut deadline_hit = false;
        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok(outcome))) => {
                    outcomes.insert(outcome.response.backend_id, outcome);
                }
                Ok(Some(Err(e))) => {
                    tracing::error!(transcript = %submission.id, "backend task failed: {e}");
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        transcript = %submission.id,
                        pending = tasks.len(),
                        "overall deadline of {:?} reached, aborting remaining backends",
                        self.deadline
                    );
                    tasks.abort_all();
                    deadline_hit = true;
                    break;
                }
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        for &backend in &requested {
            outcomes.entry(backend).or_insert_with(|| {
                let error = if deadline_hit {
                    InvocationError::Timeout(self.deadline.as_millis() as u64)
                } else {
                    InvocationError::Transport("backend task ended without a result".to_string())
                };
                BackendOutcome {
                    response: RawModelResponse::failure(backend, error, elapsed),
                    record: None,
                }
            });
        }

        let all_unavailable = outcomes.values().all(|o| {
            o.response
                .error
                .as_ref()
                .is_some_and(InvocationError::is_unavailable)
        });
        if all_unavailable {
            let reasons = outcomes
                .iter()
                .filter_map(|(id, o)| o.response.error.as_ref().map(|e| format!("{id}: {e}")))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CompareError::AllBackendsUnavailable(reasons));
        }

        let backend_scores: BTreeMap<BackendId, _> = outcomes
            .iter()
            .map(|(id, outcome)| (*id, self.scorer.score(outcome)))
            .collect();
        let (winner, reason) = self.scorer.decide(&backend_scores);

        tracing::info!(
            transcript = %submission.id,
            winner = %winner,
            elapsed_seconds = elapsed,
            "comparison complete: {reason}"
        );

        Ok(ComparisonResult {
            transcript_id: submission.id.clone(),
            backend_scores,
            winner,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callintel_backend::{ModelLifecycle, ScriptedBackend};
    use callintel_core::{Transcript, Winner};

    const THREE_INSIGHTS: &str =
        r#"{"key_insights": ["a", "b"], "recommended_actions": ["c"], "business_priority": "high"}"#;

    fn submission() -> CallSubmission {
        CallSubmission {
            id: "call-1".to_string(),
            client_name: "Sandhya".to_string(),
            transcript: Transcript::new("Can I call you in the evening? Yes, call me."),
        }
    }

    fn engine(fast: ScriptedBackend, deep: ScriptedBackend, config: ComparisonConfig) -> ComparisonEngine {
        let mut invoker = ModelInvoker::new();
        invoker.insert(BackendId::Fast, Box::new(fast), ModelLifecycle::ready(), Duration::from_secs(5));
        invoker.insert(BackendId::Deep, Box::new(deep), ModelLifecycle::ready(), Duration::from_secs(5));
        ComparisonEngine::new(
            Arc::new(invoker),
            Arc::new(StructuredExtractor::new()),
            &config,
        )
    }

    #[tokio::test]
    async fn test_compare_runs_backends_concurrently() {
        let engine = engine(
            ScriptedBackend::new(THREE_INSIGHTS).with_delay(Duration::from_millis(300)),
            ScriptedBackend::new(THREE_INSIGHTS).with_delay(Duration::from_millis(300)),
            ComparisonConfig::default(),
        );
        let start = std::time::Instant::now();
        let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(550));
        assert_eq!(result.backend_scores.len(), 2);
    }

    #[tokio::test]
    async fn test_compare_no_backends() {
        let engine = engine(
            ScriptedBackend::new("{}"),
            ScriptedBackend::new("{}"),
            ComparisonConfig::default(),
        );
        assert!(matches!(
            engine.compare(&submission(), &[]).await,
            Err(CompareError::NoBackends)
        ));
    }

    #[tokio::test]
    async fn test_compare_deadline_marks_slow_backend_timed_out() {
        let config = ComparisonConfig {
            overall_deadline_seconds: 1,
            ..ComparisonConfig::default()
        };
        let engine = engine(
            ScriptedBackend::new(THREE_INSIGHTS),
            ScriptedBackend::new(THREE_INSIGHTS).with_delay(Duration::from_secs(4)),
            config,
        );
        let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
        let deep = &result.backend_scores[&BackendId::Deep];
        assert!(!deep.succeeded);
        assert_eq!(result.winner, Winner::Backend(BackendId::Fast));
        assert!(result.reason.contains("reliability"));
    }

    #[tokio::test]
    async fn test_compare_duplicate_backend_ids_collapse() {
        let engine = engine(
            ScriptedBackend::new(THREE_INSIGHTS),
            ScriptedBackend::new(THREE_INSIGHTS),
            ComparisonConfig::default(),
        );
        let result = engine
            .compare(&submission(), &[BackendId::Fast, BackendId::Fast])
            .await
            .unwrap();
        assert_eq!(result.backend_scores.len(), 1);
        assert_eq!(result.winner, Winner::Backend(BackendId::Fast));
    }
}
