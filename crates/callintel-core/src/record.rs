use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Parses a case-insensitive enum label, trimming surrounding whitespace.
macro_rules! label_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!(
                        "'{other}' is not one of {}",
                        Self::LABELS.join("/")
                    )),
                }
            }
        }
    };
}

label_enum!(Level {
    Low => "low",
    Medium => "medium",
    High => "high",
});

label_enum!(ServiceType {
    Wedding => "wedding",
    Engagement => "engagement",
    Portrait => "portrait",
    Commercial => "commercial",
    Other => "other",
});

label_enum!(DecisionTimeline {
    Immediate => "immediate",
    Short => "short",
    Medium => "medium",
    Long => "long",
});

/// Provenance of a record: cleanly parsed from model JSON, or rebuilt by the
/// keyword fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Parsed,
    Fallback,
}

/// Inclusive domains for every numeric field.
pub mod domain {
    pub const SENTIMENT: (f64, f64) = (-1.0, 1.0);
    pub const SCORE: (i64, i64) = (1, 10);
    pub const BOOKING_PROBABILITY: (i64, i64) = (0, 100);
}

/// Structured summary of one call. Scalars are `None` when the model omitted
/// them or produced a value outside the field's domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessIntelligenceRecord {
    pub source: RecordSource,

    pub overall_sentiment: Option<f64>,
    pub client_sentiment: Option<f64>,
    pub agent_sentiment: Option<f64>,

    pub agent_professionalism: Option<u8>,
    pub agent_responsiveness: Option<u8>,
    pub agent_knowledge: Option<u8>,
    pub client_engagement_level: Option<u8>,
    pub client_interest_level: Option<u8>,

    pub quote_discussed: Option<bool>,
    pub budget_mentioned: Option<bool>,
    pub timeline_discussed: Option<bool>,
    pub next_steps_defined: Option<bool>,
    pub follow_up_required: Option<bool>,

    pub business_priority: Option<Level>,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    pub estimated_booking_probability: Option<u8>,
    pub service_type: Option<ServiceType>,
    pub pricing_sensitivity: Option<Level>,
    pub decision_timeline: Option<DecisionTimeline>,
    pub potential_revenue: Option<f64>,

    #[serde(default)]
    pub reasoning_chain: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub upsell_opportunities: Vec<String>,
    #[serde(default)]
    pub competitive_advantages: Vec<String>,
}

impl BusinessIntelligenceRecord {
    /// A record with every field missing.
    pub fn empty(source: RecordSource) -> Self {
        Self {
            source,
            overall_sentiment: None,
            client_sentiment: None,
            agent_sentiment: None,
            agent_professionalism: None,
            agent_responsiveness: None,
            agent_knowledge: None,
            client_engagement_level: None,
            client_interest_level: None,
            quote_discussed: None,
            budget_mentioned: None,
            timeline_discussed: None,
            next_steps_defined: None,
            follow_up_required: None,
            business_priority: None,
            key_insights: Vec::new(),
            recommended_actions: Vec::new(),
            estimated_booking_probability: None,
            service_type: None,
            pricing_sensitivity: None,
            decision_timeline: None,
            potential_revenue: None,
            reasoning_chain: Vec::new(),
            risk_factors: Vec::new(),
            upsell_opportunities: Vec::new(),
            competitive_advantages: Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.source == RecordSource::Fallback
    }

    /// True when at least one field survived validation.
    pub fn has_usable_fields(&self) -> bool {
        let scalars = [
            self.overall_sentiment.is_some(),
            self.client_sentiment.is_some(),
            self.agent_sentiment.is_some(),
            self.agent_professionalism.is_some(),
            self.agent_responsiveness.is_some(),
            self.agent_knowledge.is_some(),
            self.client_engagement_level.is_some(),
            self.client_interest_level.is_some(),
            self.quote_discussed.is_some(),
            self.budget_mentioned.is_some(),
            self.timeline_discussed.is_some(),
            self.next_steps_defined.is_some(),
            self.follow_up_required.is_some(),
            self.business_priority.is_some(),
            self.estimated_booking_probability.is_some(),
            self.service_type.is_some(),
            self.pricing_sensitivity.is_some(),
            self.decision_timeline.is_some(),
            self.potential_revenue.is_some(),
        ];
        let lists = [
            &self.key_insights,
            &self.recommended_actions,
            &self.reasoning_chain,
            &self.risk_factors,
            &self.upsell_opportunities,
            &self.competitive_advantages,
        ];
        scalars.iter().any(|present| *present) || lists.iter().any(|l| !l.is_empty())
    }

    pub fn insight_count(&self) -> usize {
        self.key_insights.len() + self.recommended_actions.len()
    }
}
