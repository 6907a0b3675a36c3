//! Extraction prompt rendering.
//!
//! The prompt is a pure function of the transcript, the client name and the
//! backend kind, so repeated comparison runs send byte-identical prompts.

use crate::types::{BackendId, Transcript};
use std::fmt::Write;

const ROLE_FRAMING: &str = "You are an expert call analytics AI for a photography business. \
Analyze this client conversation and provide detailed business intelligence.";

/// `(field, domain)` pairs rendered into the JSON schema block.
const SCHEMA_FIELDS: &[(&str, &str)] = &[
    ("overall_sentiment", "<number between -1.0 and 1.0>"),
    ("client_sentiment", "<number between -1.0 and 1.0>"),
    ("agent_sentiment", "<number between -1.0 and 1.0>"),
    ("agent_professionalism", "<integer 1-10>"),
    ("agent_responsiveness", "<integer 1-10>"),
    ("agent_knowledge", "<integer 1-10>"),
    ("client_engagement_level", "<integer 1-10>"),
    ("client_interest_level", "<integer 1-10>"),
    ("quote_discussed", "<true/false>"),
    ("budget_mentioned", "<true/false>"),
    ("timeline_discussed", "<true/false>"),
    ("next_steps_defined", "<true/false>"),
    ("follow_up_required", "<true/false>"),
    ("business_priority", "\"<low/medium/high>\""),
    ("key_insights", "[<array of key business insights>]"),
    ("recommended_actions", "[<array of specific action items>]"),
    ("estimated_booking_probability", "<integer 0-100>"),
    ("service_type", "\"<wedding/engagement/portrait/commercial/other>\""),
    ("pricing_sensitivity", "\"<low/medium/high>\""),
    ("decision_timeline", "\"<immediate/short/medium/long>\""),
    ("potential_revenue", "<estimated non-negative value or 0 if unknown>"),
];

const DEEP_SCHEMA_FIELDS: &[(&str, &str)] = &[
    ("reasoning_chain", "[<array showing step-by-step analysis>]"),
    ("risk_factors", "[<potential challenges or concerns>]"),
    ("upsell_opportunities", "[<additional services to propose>]"),
    ("competitive_advantages", "[<identified strengths to leverage>]"),
];

const DEEP_REASONING_INSTRUCTION: &str = "Think step by step. Before the JSON, write a \
numbered list of your reasoning steps, then repeat those steps as the \"reasoning_chain\" \
array inside the JSON.";

const JSON_ONLY_INSTRUCTION: &str = "Respond with ONLY the JSON object, no other text.";

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Render the extraction prompt for `backend`.
    pub fn build(&self, transcript: &Transcript, client_name: &str, backend: BackendId) -> String {
        let mut prompt = String::with_capacity(transcript.text.len() + 2048);

        let _ = writeln!(prompt, "{ROLE_FRAMING}");
        prompt.push('\n');
        let _ = writeln!(prompt, "CLIENT: {}", client_name.trim());
        if let Some(duration) = transcript.duration_seconds {
            let _ = writeln!(prompt, "CALL DURATION: {duration:.0} seconds");
        }
        if let Some(language) = transcript.detected_language.as_deref() {
            let _ = writeln!(prompt, "DETECTED LANGUAGE: {language}");
        }
        let _ = writeln!(prompt, "TRANSCRIPT: {}", transcript.text);
        prompt.push('\n');

        prompt.push_str("Provide analysis in this EXACT JSON format:\n{\n");
        let fields: Vec<&(&str, &str)> = if backend.is_deep() {
            SCHEMA_FIELDS.iter().chain(DEEP_SCHEMA_FIELDS).collect()
        } else {
            SCHEMA_FIELDS.iter().collect()
        };
        let last = fields.len() - 1;
        for (i, (name, domain)) in fields.into_iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            let _ = writeln!(prompt, "  \"{name}\": {domain}{sep}");
        }
        prompt.push_str("}\n\n");

        if backend.is_deep() {
            let _ = writeln!(prompt, "{DEEP_REASONING_INSTRUCTION}");
        }
        prompt.push_str(JSON_ONLY_INSTRUCTION);
        prompt.push('\n');
        prompt
    }
}
