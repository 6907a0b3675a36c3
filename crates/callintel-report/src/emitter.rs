use callintel_core::{BackendId, ReportEntry, ReportError, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const HYBRID_TEXT: &str = "no clear winner — consider hybrid use";

/// Batch-level verdict chosen by simple majority of wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Recommendation {
    Adopt { backend: BackendId },
    Hybrid,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adopt { backend } => write!(f, "adopt {backend}: most comparison wins"),
            Self::Hybrid => f.write_str(HYBRID_TEXT),
        }
    }
}

/// Aggregate counts shared by the full report and the history line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub wins: BTreeMap<BackendId, usize>,
    pub ties: usize,
    pub skipped: usize,
    pub average_latency_seconds: BTreeMap<BackendId, f64>,
    pub recommendation: Recommendation,
    pub recommendation_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub entries: Vec<ReportEntry>,
}

impl ComparisonReport {
    /// Pretty JSON with a trailing newline. Maps are ordered, so equal reports
    /// render to identical bytes.
    pub fn to_json(&self) -> Result<String, ReportError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Folds a batch of entries into a [`ComparisonReport`]. Pure: no I/O and no
/// clock reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportEmitter;

impl ReportEmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, entries: &[ReportEntry]) -> ComparisonReport {
        let mut wins: BTreeMap<BackendId, usize> = BTreeMap::new();
        let mut latency: BTreeMap<BackendId, (f64, usize)> = BTreeMap::new();
        let mut ties = 0;
        let mut skipped = 0;

        for entry in entries {
            let result = match entry {
                ReportEntry::Compared(result) => result,
                ReportEntry::Skipped { .. } => {
                    skipped += 1;
                    continue;
                }
            };
            for (backend, score) in &result.backend_scores {
                wins.entry(*backend).or_insert(0);
                let slot = latency.entry(*backend).or_insert((0.0, 0));
                slot.0 += score.latency_seconds;
                slot.1 += 1;
            }
            match result.winner {
                Winner::Backend(backend) => *wins.entry(backend).or_insert(0) += 1,
                Winner::Tie => ties += 1,
            }
        }

        let average_latency_seconds = latency
            .into_iter()
            .map(|(backend, (sum, count))| (backend, sum / count as f64))
            .collect();
        let recommendation = Self::recommend(&wins);

        ComparisonReport {
            summary: ReportSummary {
                total: entries.len(),
                wins,
                ties,
                skipped,
                average_latency_seconds,
                recommendation,
                recommendation_text: recommendation.to_string(),
            },
            entries: entries.to_vec(),
        }
    }

    /// `Adopt` only when one backend has strictly more wins than every other.
    fn recommend(wins: &BTreeMap<BackendId, usize>) -> Recommendation {
        let Some(most) = wins.values().copied().max().filter(|m| *m > 0) else {
            return Recommendation::Hybrid;
        };
        let mut leaders = wins.iter().filter(|(_, w)| **w == most);
        match (leaders.next(), leaders.next()) {
            (Some((backend, _)), None) => Recommendation::Adopt { backend: *backend },
            _ => Recommendation::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callintel_core::{BackendScore, ComparisonResult};

    fn score(latency: f64) -> BackendScore {
        BackendScore {
            latency_seconds: latency,
            insight_count: 2,
            succeeded: true,
            source: None,
            reliability: 1.0,
            richness: 2.0,
            total: 3.0,
        }
    }

    fn compared(id: &str, winner: Winner, fast: f64, deep: f64) -> ReportEntry {
        ReportEntry::Compared(ComparisonResult {
            transcript_id: id.to_string(),
            backend_scores: BTreeMap::from([(BackendId::Fast, score(fast)), (BackendId::Deep, score(deep))]),
            winner,
            reason: "test".to_string(),
        })
    }

    #[test]
    fn test_emit_counts_wins_ties_and_skips() {
        let entries = vec![
            compared("a", Winner::Backend(BackendId::Fast), 1.0, 30.0),
            compared("b", Winner::Backend(BackendId::Fast), 2.0, 50.0),
            compared("c", Winner::Tie, 3.0, 40.0),
            ReportEntry::Skipped {
                transcript_id: "d".to_string(),
                reason: "transcript unavailable".to_string(),
            },
        ];
        let report = ReportEmitter::new().emit(&entries);
        let summary = &report.summary;
        assert_eq!(summary.wins[&BackendId::Fast], 2);
        assert_eq!(summary.wins[&BackendId::Deep], 0);
        assert_eq!(summary.ties, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.average_latency_seconds[&BackendId::Fast], 2.0);
        assert_eq!(summary.average_latency_seconds[&BackendId::Deep], 40.0);
        assert_eq!(summary.recommendation, Recommendation::Adopt { backend: BackendId::Fast });
        assert_eq!(report.entries.len(), 4);
    }

    #[test]
    fn test_equal_wins_recommend_hybrid() {
        let entries = vec![
            compared("a", Winner::Backend(BackendId::Fast), 1.0, 30.0),
            compared("b", Winner::Backend(BackendId::Deep), 1.0, 30.0),
        ];
        let report = ReportEmitter::new().emit(&entries);
        assert_eq!(report.summary.recommendation, Recommendation::Hybrid);
        assert_eq!(report.summary.recommendation_text, HYBRID_TEXT);
    }

    #[test]
    fn test_only_ties_recommend_hybrid() {
        let entries = vec![compared("a", Winner::Tie, 1.0, 1.0)];
        let report = ReportEmitter::new().emit(&entries);
        assert_eq!(report.summary.recommendation, Recommendation::Hybrid);
    }

    #[test]
    fn test_empty_batch() {
        let report = ReportEmitter::new().emit(&[]);
        assert_eq!(report.summary.total, 0);
        assert!(report.summary.wins.is_empty());
        assert_eq!(report.summary.recommendation, Recommendation::Hybrid);
    }

    #[test]
    fn test_report_json_is_flat_and_ordered() {
        let entries = vec![compared("a", Winner::Backend(BackendId::Deep), 1.0, 2.0)];
        let json = ReportEmitter::new().emit(&entries).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["wins"]["deep"], 1);
        assert_eq!(value["recommendation"]["decision"], "adopt");
        assert_eq!(value["entries"][0]["status"], "compared");
        assert_eq!(value["entries"][0]["winner"], "deep");
        assert!(json.find("\"fast\"").unwrap() < json.find("\"deep\"").unwrap());
    }
}
