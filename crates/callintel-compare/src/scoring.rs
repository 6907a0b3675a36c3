//! Scoring of backend outcomes and the winner decision.
//!
//! Candidates are compared lexicographically: reliability tier first, then
//! insight richness within a relative threshold band, then latency. Anything
//! still level after that is a tie.

use callintel_core::{
    BackendId, BackendScore, BusinessIntelligenceRecord, ComparisonConfig, RawModelResponse,
    RecordSource, Winner, TIE_REASON,
};
use std::collections::BTreeMap;

/// Everything one backend produced for one transcript. `record` is `None`
/// when the invocation itself failed.
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    pub response: RawModelResponse,
    pub record: Option<BusinessIntelligenceRecord>,
}

impl BackendOutcome {
    /// Transport errors, timeouts and empty output all count as failure.
    pub fn failed(&self) -> bool {
        !self.response.succeeded || self.response.raw_text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Failed,
    Degraded,
    Clean,
}

impl Tier {
    fn label(self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Degraded => "degraded parse",
            Self::Clean => "clean parse",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    config: ComparisonConfig,
}

impl Scorer {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    fn tier(&self, outcome: &BackendOutcome) -> Tier {
        match &outcome.record {
            _ if outcome.failed() => Tier::Failed,
            None => Tier::Failed,
            Some(record) if record.source == RecordSource::Fallback => Tier::Degraded,
            Some(_) => Tier::Clean,
        }
    }

    fn tier_of(&self, score: &BackendScore) -> Tier {
        if score.reliability == self.config.clean_score {
            Tier::Clean
        } else if score.reliability == self.config.degraded_score {
            Tier::Degraded
        } else {
            Tier::Failed
        }
    }

    fn richness(&self, backend: BackendId, record: &BusinessIntelligenceRecord) -> f64 {
        let mut richness = record.insight_count() as f64;
        if backend.is_deep() {
            richness += self.config.reasoning_weight * record.reasoning_chain.len() as f64
                + self.config.risk_weight * record.risk_factors.len() as f64
                + self.config.upsell_weight * record.upsell_opportunities.len() as f64;
        }
        richness
    }

    pub fn score(&self, outcome: &BackendOutcome) -> BackendScore {
        let backend = outcome.response.backend_id;
        let reliability = match self.tier(outcome) {
            Tier::Failed => self.config.failure_score,
            Tier::Degraded => self.config.degraded_score,
            Tier::Clean => self.config.clean_score,
        };
        let richness = outcome
            .record
            .as_ref()
            .map_or(0.0, |record| self.richness(backend, record));

        BackendScore {
            latency_seconds: outcome.response.latency_seconds,
            insight_count: outcome.record.as_ref().map_or(0, |r| r.insight_count()),
            succeeded: outcome.response.succeeded,
            source: outcome.record.as_ref().map(|r| r.source),
            reliability,
            richness,
            total: reliability + richness,
        }
    }

    /// Pick a winner from per-backend scores. The result depends only on the
    /// map contents, so the order backends were requested in never matters.
    pub fn decide(&self, scores: &BTreeMap<BackendId, BackendScore>) -> (Winner, String) {
        let Some(best_reliability) = scores.values().map(|s| s.reliability).reduce(f64::max) else {
            return (Winner::Tie, TIE_REASON.to_string());
        };

        let (tier, rest): (Vec<_>, Vec<_>) = scores
            .iter()
            .partition(|(_, s)| s.reliability == best_reliability);

        // Every candidate failed.
        if self.tier_of(tier[0].1) == Tier::Failed {
            return (Winner::Tie, TIE_REASON.to_string());
        }

        if let [(id, score)] = tier.as_slice() {
            if rest.is_empty() {
                return (Winner::Backend(**id), format!("{id} was the only backend compared"));
            }
            let others = rest
                .iter()
                .map(|(other, s)| format!("{other} {}", self.tier_of(s).label()))
                .collect::<Vec<_>>()
                .join(", ");
            return (
                Winner::Backend(**id),
                format!(
                    "higher reliability: {} {} vs {others}",
                    id,
                    self.tier_of(score).label()
                ),
            );
        }

        let best_richness = tier.iter().map(|(_, s)| s.richness).fold(0.0, f64::max);
        let band = self.config.richness_threshold_ratio * best_richness;
        let (contenders, outclassed): (Vec<_>, Vec<_>) = tier
            .into_iter()
            .partition(|(_, s)| best_richness - s.richness == 0.0 || best_richness - s.richness < band);

        if let [(id, score)] = contenders.as_slice() {
            let others = outclassed
                .iter()
                .map(|(other, s)| format!("{other} {}", s.richness))
                .collect::<Vec<_>>()
                .join(", ");
            return (
                Winner::Backend(**id),
                format!("greater insight richness: {id} {} vs {others}", score.richness),
            );
        }

        let mut by_latency = contenders.clone();
        by_latency.sort_by(|a, b| a.1.latency_seconds.total_cmp(&b.1.latency_seconds));
        let (fastest, fastest_score) = by_latency[0];
        let runner_up = by_latency[1].1;
        if runner_up.latency_seconds - fastest_score.latency_seconds > self.config.latency_epsilon_seconds {
            return (
                Winner::Backend(*fastest),
                format!(
                    "lower latency with comparable richness: {fastest} {:.2}s vs {:.2}s",
                    fastest_score.latency_seconds, runner_up.latency_seconds
                ),
            );
        }

        (Winner::Tie, TIE_REASON.to_string())
    }
}
