pub mod comparison;
pub mod config;
pub mod error;
pub mod prompt;
pub mod record;
pub mod source;
pub mod types;

pub use comparison::{BackendScore, ComparisonResult, ReportEntry, Winner, TIE_REASON};
pub use config::{AppConfig, BackendConfig, ComparisonConfig};
pub use error::{
    BackendError, CompareError, ConfigError, InvocationError, ParseError, ReportError,
    SourceError,
};
pub use prompt::PromptBuilder;
pub use record::{BusinessIntelligenceRecord, DecisionTimeline, Level, RecordSource, ServiceType};
pub use source::{SidecarDirectorySource, TranscriptSource};
pub use types::{AnalysisRequest, BackendId, CallSubmission, RawModelResponse, Transcript};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_request_fields() {
        let request = AnalysisRequest {
            transcript: Transcript::new("hello"),
            client_name: "Sandhya".to_string(),
            backend_id: BackendId::Deep,
        };
        assert_eq!(request.transcript.text, "hello");
        assert_eq!(request.client_name, "Sandhya");
        assert!(request.backend_id.is_deep());
    }

    #[test]
    fn test_invocation_error_from_backend_error() {
        let unavailable: InvocationError =
            BackendError::ModelUnavailable("weights missing".to_string()).into();
        assert!(unavailable.is_unavailable());

        let transport: InvocationError = BackendError::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        match transport {
            InvocationError::Transport(msg) => assert!(msg.contains("500")),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_invocation_error_serializes_kind() {
        let json = serde_json::to_value(InvocationError::Timeout(30_000)).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["detail"], 30_000);
    }
}
