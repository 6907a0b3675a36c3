use callintel_backend::{ModelInvoker, ModelLifecycle, ScriptedBackend};
use callintel_compare::ComparisonEngine;
use callintel_core::{
    BackendId, CallSubmission, CompareError, ComparisonConfig, Transcript, Winner, TIE_REASON,
};
use callintel_extract::StructuredExtractor;
use std::sync::Arc;
use std::time::Duration;

const TWO_INSIGHTS: &str = r#"{"key_insights": ["Venue visit planned", "Budget 5K"], "business_priority": "medium"}"#;
const THREE_INSIGHTS: &str =
    r#"{"key_insights": ["Venue visit planned", "Budget 5K"], "recommended_actions": ["Call in the evening"]}"#;

fn submission() -> CallSubmission {
    CallSubmission {
        id: "call-42".to_string(),
        client_name: "Sandhya".to_string(),
        transcript: Transcript::new("I checked the venue this morning. 5K? Yes, 5K. Call me in the evening."),
    }
}

fn engine(
    fast: (ScriptedBackend, ModelLifecycle),
    deep: (ScriptedBackend, ModelLifecycle),
) -> ComparisonEngine {
    let mut invoker = ModelInvoker::new();
    invoker.insert(BackendId::Fast, Box::new(fast.0), fast.1, Duration::from_secs(10));
    invoker.insert(BackendId::Deep, Box::new(deep.0), deep.1, Duration::from_secs(10));
    ComparisonEngine::new(
        Arc::new(invoker),
        Arc::new(StructuredExtractor::new()),
        &ComparisonConfig::default(),
    )
}

fn ready(backend: ScriptedBackend) -> (ScriptedBackend, ModelLifecycle) {
    (backend, ModelLifecycle::ready())
}

#[tokio::test]
async fn test_transport_failure_loses_to_clean_parse() {
    let engine = engine(
        ready(ScriptedBackend::new("").failing("connection refused")),
        ready(ScriptedBackend::new(THREE_INSIGHTS)),
    );
    let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
    assert_eq!(result.winner, Winner::Backend(BackendId::Deep));
    assert!(result.reason.contains("reliability"));
    assert_eq!(result.backend_scores[&BackendId::Deep].insight_count, 3);
    assert!(!result.backend_scores[&BackendId::Fast].succeeded);
}

#[tokio::test]
async fn test_equal_richness_lower_latency_wins() {
    let engine = engine(
        ready(ScriptedBackend::new(TWO_INSIGHTS).with_delay(Duration::from_millis(100))),
        ready(ScriptedBackend::new(TWO_INSIGHTS).with_delay(Duration::from_millis(300))),
    );
    let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
    assert_eq!(result.winner, Winner::Backend(BackendId::Fast));
    assert!(result.reason.contains("latency"));
}

#[tokio::test]
async fn test_both_failed_is_tie() {
    let engine = engine(
        ready(ScriptedBackend::new("").failing("connection refused")),
        ready(ScriptedBackend::new("").failing("HTTP 500")),
    );
    let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
    assert_eq!(result.winner, Winner::Tie);
    assert_eq!(result.reason, TIE_REASON);
}

#[tokio::test]
async fn test_empty_output_is_scored_as_failure() {
    let engine = engine(
        ready(ScriptedBackend::new("   ")),
        ready(ScriptedBackend::new("The client seems keen, call back tomorrow.")),
    );
    let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
    assert_eq!(result.winner, Winner::Backend(BackendId::Deep));
    assert!(result.reason.contains("reliability"));
}

#[tokio::test]
async fn test_winner_independent_of_request_order() {
    let build = || {
        engine(
            ready(ScriptedBackend::new(TWO_INSIGHTS).with_delay(Duration::from_millis(50))),
            ready(ScriptedBackend::new(THREE_INSIGHTS).with_delay(Duration::from_millis(150))),
        )
    };
    let forward = build()
        .compare(&submission(), &[BackendId::Fast, BackendId::Deep])
        .await
        .unwrap();
    let reverse = build()
        .compare(&submission(), &[BackendId::Deep, BackendId::Fast])
        .await
        .unwrap();
    assert_eq!(forward.winner, reverse.winner);
    assert_eq!(forward.winner, Winner::Backend(BackendId::Deep));
    assert_eq!(forward.reason, reverse.reason);
}

#[tokio::test]
async fn test_all_backends_unavailable_aborts() {
    let engine = engine(
        (ScriptedBackend::new(TWO_INSIGHTS), ModelLifecycle::new()),
        (ScriptedBackend::new(TWO_INSIGHTS), ModelLifecycle::new()),
    );
    match engine.compare(&submission(), &BackendId::ALL).await {
        Err(CompareError::AllBackendsUnavailable(reason)) => {
            assert!(reason.contains("fast"));
            assert!(reason.contains("deep"));
        }
        other => panic!("expected AllBackendsUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_one_unavailable_backend_still_compares() {
    let engine = engine(
        ready(ScriptedBackend::new(TWO_INSIGHTS)),
        (ScriptedBackend::new(THREE_INSIGHTS), ModelLifecycle::new()),
    );
    let result = engine.compare(&submission(), &BackendId::ALL).await.unwrap();
    assert_eq!(result.winner, Winner::Backend(BackendId::Fast));
    assert_eq!(result.backend_scores[&BackendId::Deep].latency_seconds, 0.0);
}
