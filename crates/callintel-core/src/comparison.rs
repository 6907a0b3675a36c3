use crate::record::RecordSource;
use crate::types::BackendId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reason recorded when no backend can be preferred.
pub const TIE_REASON: &str = "comparable richness and reliability";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendScore {
    pub latency_seconds: f64,
    pub insight_count: usize,
    pub succeeded: bool,
    /// `None` when the backend produced nothing to extract from.
    pub source: Option<RecordSource>,
    pub reliability: f64,
    pub richness: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Winner {
    Backend(BackendId),
    Tie,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(id) => write!(f, "{id}"),
            Self::Tie => f.write_str("tie"),
        }
    }
}

impl From<Winner> for String {
    fn from(winner: Winner) -> Self {
        winner.to_string()
    }
}

impl TryFrom<String> for Winner {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("tie") {
            return Ok(Self::Tie);
        }
        value.parse().map(Self::Backend)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub transcript_id: String,
    pub backend_scores: BTreeMap<BackendId, BackendScore>,
    pub winner: Winner,
    pub reason: String,
}

/// One line of a batch: either a comparison outcome or the reason the
/// transcript could not be compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportEntry {
    Compared(ComparisonResult),
    Skipped { transcript_id: String, reason: String },
}

impl ReportEntry {
    pub fn transcript_id(&self) -> &str {
        match self {
            Self::Compared(result) => &result.transcript_id,
            Self::Skipped { transcript_id, .. } => transcript_id,
        }
    }
}
