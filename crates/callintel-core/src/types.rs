use crate::error::InvocationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plain-text transcript of one recorded call, as produced upstream by the
/// speech-to-text step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    #[serde(default)]
    pub speaker_label: String,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub detected_language: Option<String>,
    #[serde(default)]
    pub language_confidence: Option<f64>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speaker_label: String::new(),
            duration_seconds: None,
            detected_language: None,
            language_confidence: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Low-latency model tuned for short responses.
    Fast,
    /// Slow model that reasons step by step before answering.
    Deep,
}

impl BackendId {
    pub const ALL: [BackendId; 2] = [BackendId::Fast, BackendId::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Deep => "deep",
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown backend id: {other}")),
        }
    }
}

/// One transcript queued for comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSubmission {
    pub id: String,
    pub client_name: String,
    pub transcript: Transcript,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub transcript: Transcript,
    pub client_name: String,
    pub backend_id: BackendId,
}

/// Outcome of a single backend invocation. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawModelResponse {
    pub backend_id: BackendId,
    pub raw_text: String,
    pub latency_seconds: f64,
    pub succeeded: bool,
    pub error: Option<InvocationError>,
}

impl RawModelResponse {
    pub fn success(backend_id: BackendId, raw_text: String, latency_seconds: f64) -> Self {
        Self {
            backend_id,
            raw_text,
            latency_seconds,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(backend_id: BackendId, error: InvocationError, latency_seconds: f64) -> Self {
        Self {
            backend_id,
            raw_text: String::new(),
            latency_seconds,
            succeeded: false,
            error: Some(error),
        }
    }
}
