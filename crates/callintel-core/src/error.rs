use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend initialization failed: {0}")]
    InitializationFailed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("model not loaded: {0}")]
    ModelUnavailable(String),

    #[error("backend plugin not found: {0}")]
    PluginNotFound(String),

    #[error("backend not registered: {0}")]
    NotRegistered(String),
}

/// Failure of a single backend invocation, carried inside a
/// [`RawModelResponse`](crate::RawModelResponse) rather than returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InvocationError {
    #[error("transport error: {0}")]
    Transport(String),

    /// Elapsed budget in milliseconds.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("model not loaded: {0}")]
    ModelUnavailable(String),
}

impl InvocationError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_))
    }
}

impl From<BackendError> for InvocationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::ModelUnavailable(msg) => Self::ModelUnavailable(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Why model output could not be mapped onto a record. Never surfaces past the
/// extractor; it selects the fallback path instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("parsed object has no usable fields")]
    NoUsableFields,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transcript unavailable: {0}")]
    Unavailable(String),

    #[error("malformed transcript sidecar {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("failed to list transcripts: {0}")]
    Listing(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("no backends requested")]
    NoBackends,

    #[error("all requested backends unavailable: {0}")]
    AllBackendsUnavailable(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report sink initialization failed: {0}")]
    InitializationFailed(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    WriteFailed(String),

    #[error("report sink not found: {0}")]
    NotFound(String),
}
