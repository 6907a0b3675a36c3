use crate::heuristic::{FallbackStrategy, KeywordHeuristic};
use crate::payload;
use crate::validate::{self, Checked};
use callintel_core::{BusinessIntelligenceRecord, ParseError, RecordSource};
use serde_json::{Map, Value};

/// Turns raw model text into a [`BusinessIntelligenceRecord`].
///
/// Structured parsing is tried first. When it yields nothing usable the
/// configured [`FallbackStrategy`] rebuilds a degraded record, so `extract`
/// always returns a record and never fails.
pub struct StructuredExtractor {
    fallback: Box<dyn FallbackStrategy>,
}

impl StructuredExtractor {
    pub fn new() -> Self {
        Self::with_fallback(Box::new(KeywordHeuristic::new()))
    }

    pub fn with_fallback(fallback: Box<dyn FallbackStrategy>) -> Self {
        Self { fallback }
    }

    pub fn extract(&self, raw_text: &str) -> BusinessIntelligenceRecord {
        match self.parse(raw_text) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(
                    strategy = self.fallback.name(),
                    chars = raw_text.len(),
                    "structured parse failed, using fallback: {e}"
                );
                self.fallback.reconstruct(raw_text)
            }
        }
    }

    /// Structured path only. Out-of-domain fields are dropped; the result is
    /// an error when no field survives.
    pub fn parse(&self, raw_text: &str) -> Result<BusinessIntelligenceRecord, ParseError> {
        let object = payload::flatten_nested(payload::locate_object(raw_text)?);
        let mut fields = Fields {
            object: &object,
            rejected: Vec::new(),
        };

        let record = BusinessIntelligenceRecord {
            source: RecordSource::Parsed,
            overall_sentiment: fields.take("overall_sentiment", validate::sentiment),
            client_sentiment: fields.take("client_sentiment", validate::sentiment),
            agent_sentiment: fields.take("agent_sentiment", validate::sentiment),
            agent_professionalism: fields.take("agent_professionalism", validate::score),
            agent_responsiveness: fields.take("agent_responsiveness", validate::score),
            agent_knowledge: fields.take("agent_knowledge", validate::score),
            client_engagement_level: fields.take("client_engagement_level", validate::score),
            client_interest_level: fields.take("client_interest_level", validate::score),
            quote_discussed: fields.take("quote_discussed", validate::flag),
            budget_mentioned: fields.take("budget_mentioned", validate::flag),
            timeline_discussed: fields.take("timeline_discussed", validate::flag),
            next_steps_defined: fields.take("next_steps_defined", validate::flag),
            follow_up_required: fields.take("follow_up_required", validate::flag),
            business_priority: fields.take("business_priority", validate::label),
            key_insights: fields.list("key_insights"),
            recommended_actions: fields.list("recommended_actions"),
            estimated_booking_probability: fields
                .take("estimated_booking_probability", validate::booking_probability),
            service_type: fields.take("service_type", validate::label),
            pricing_sensitivity: fields.take("pricing_sensitivity", validate::label),
            decision_timeline: fields.take("decision_timeline", validate::label),
            potential_revenue: fields.take("potential_revenue", validate::revenue),
            reasoning_chain: fields.list("reasoning_chain"),
            risk_factors: fields.list("risk_factors"),
            upsell_opportunities: fields.list("upsell_opportunities"),
            competitive_advantages: fields.list("competitive_advantages"),
        };

        if !fields.rejected.is_empty() {
            tracing::debug!(rejected = ?fields.rejected, "dropped out-of-domain fields");
        }
        if !record.has_usable_fields() {
            return Err(ParseError::NoUsableFields);
        }
        Ok(record)
    }
}

impl Default for StructuredExtractor {
    fn default() -> Self {
        Self::new()
    }
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    rejected: Vec<&'static str>,
}

impl Fields<'_> {
    fn take<T>(
        &mut self,
        key: &'static str,
        check: impl FnOnce(Option<&Value>) -> Checked<T>,
    ) -> Option<T> {
        let checked = check(self.object.get(key));
        if checked.is_rejected() {
            self.rejected.push(key);
        }
        checked.into_option()
    }

    fn list(&mut self, key: &'static str) -> Vec<String> {
        self.take(key, validate::string_list).unwrap_or_default()
    }
}
