//! Keyword fallback used when model output carries no usable JSON payload.

use callintel_core::{
    BusinessIntelligenceRecord, DecisionTimeline, Level, RecordSource, ServiceType,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rebuilds a record from raw model text when structured parsing fails.
/// Implementations must always return a complete record tagged
/// [`RecordSource::Fallback`].
pub trait FallbackStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn reconstruct(&self, raw_text: &str) -> BusinessIntelligenceRecord;
}

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:₹|\$|€|£|\brs\.?|\binr\b|\brupees?\b|\bdollars?\b)\s*\d|\b\d+(?:[.,]\d+)?\s*(?:k|lakhs?|lacs?|crores?|thousand)\b",
    )
    .expect("static pattern")
});

static TEMPORAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:morning|afternoon|evening|tonight|night)\b|\b\d{1,2}:\d{2}\b|\b\d{1,2}(?:[.:]\d{2})?\s*(?:am|pm)\b",
    )
    .expect("static pattern")
});

static SCHEDULING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:call (?:you|me|back)|follow[- ]?up|schedul(?:e|ed|ing)|appointment|meeting|visit|tomorrow|next week|get back)\b",
    )
    .expect("static pattern")
});

static QUOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:quote|quotation|package|pricing|price)\b").expect("static pattern")
});

static SERVICE: Lazy<[(Regex, ServiceType); 4]> = Lazy::new(|| {
    [
        (
            Regex::new(r"(?i)\b(?:wedding|marriage|reception|bride|groom)\b").expect("static pattern"),
            ServiceType::Wedding,
        ),
        (
            Regex::new(r"(?i)\bengagement\b").expect("static pattern"),
            ServiceType::Engagement,
        ),
        (
            Regex::new(r"(?i)\b(?:portrait|headshot|maternity)\b").expect("static pattern"),
            ServiceType::Portrait,
        ),
        (
            Regex::new(r"(?i)\b(?:commercial|corporate|product shoot|brand)\b").expect("static pattern"),
            ServiceType::Commercial,
        ),
    ]
});

/// Scans the model's raw text (never the transcript) for money, time and
/// scheduling evidence, and fills the rest with mid-range defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordHeuristic;

impl KeywordHeuristic {
    pub fn new() -> Self {
        Self
    }

    fn service_type(text: &str) -> ServiceType {
        SERVICE
            .iter()
            .find(|(pattern, _)| pattern.is_match(text))
            .map_or(ServiceType::Other, |(_, service)| *service)
    }
}

impl FallbackStrategy for KeywordHeuristic {
    fn name(&self) -> &str {
        "keyword"
    }

    fn reconstruct(&self, raw_text: &str) -> BusinessIntelligenceRecord {
        let budget_mentioned = AMOUNT.is_match(raw_text);
        let timeline_discussed = TEMPORAL.is_match(raw_text);
        let next_steps_defined = SCHEDULING.is_match(raw_text);
        let quote_discussed = budget_mentioned || QUOTE.is_match(raw_text);

        let mut key_insights = Vec::new();
        if budget_mentioned {
            key_insights.push("Budget or amount mentioned".to_string());
        }
        if timeline_discussed {
            key_insights.push("Timing discussed".to_string());
        }
        if next_steps_defined {
            key_insights.push("Next steps referenced".to_string());
        }

        let mut recommended_actions = vec!["Schedule follow-up call".to_string()];
        if quote_discussed {
            recommended_actions.push("Prepare detailed quote".to_string());
        }

        let mut record = BusinessIntelligenceRecord::empty(RecordSource::Fallback);
        record.overall_sentiment = Some(0.0);
        record.client_sentiment = Some(0.0);
        record.agent_sentiment = Some(0.0);
        record.agent_professionalism = Some(5);
        record.agent_responsiveness = Some(5);
        record.agent_knowledge = Some(5);
        record.client_engagement_level = Some(5);
        record.client_interest_level = Some(5);
        record.quote_discussed = Some(quote_discussed);
        record.budget_mentioned = Some(budget_mentioned);
        record.timeline_discussed = Some(timeline_discussed);
        record.next_steps_defined = Some(next_steps_defined);
        record.follow_up_required = Some(true);
        record.business_priority = Some(Level::Medium);
        record.key_insights = key_insights;
        record.recommended_actions = recommended_actions;
        record.estimated_booking_probability = Some(50);
        record.service_type = Some(Self::service_type(raw_text));
        record.pricing_sensitivity = Some(Level::Medium);
        record.decision_timeline = Some(DecisionTimeline::Medium);
        record.potential_revenue = Some(0.0);
        record
    }
}
