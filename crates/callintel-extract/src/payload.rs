//! Locating the JSON object embedded in free-form model output.

use callintel_core::ParseError;
use serde_json::{Map, Value};

const RISK_GROUPS: [&str; 3] = ["booking_risks", "financial_risks", "operational_risks"];

/// Parse the span from the first `{` to the last `}` of `raw`.
pub fn locate_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoObject)?;
    let end = raw.rfind('}').ok_or(ParseError::NoObject)?;
    if end < start {
        return Err(ParseError::NoObject);
    }
    match serde_json::from_str::<Value>(&raw[start..=end])? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError::NoObject),
    }
}

/// Lift the nested layout produced by reasoning prompts onto the flat field
/// names. Keys already present at the top level win.
pub fn flatten_nested(mut map: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(inner)) = map.remove("business_intelligence") {
        for (key, value) in inner {
            map.entry(key).or_insert(value);
        }
    }

    if let Some(Value::Object(risks)) = map.remove("risk_assessment") {
        if !map.contains_key("risk_factors") {
            let merged: Vec<Value> = RISK_GROUPS
                .iter()
                .filter_map(|group| risks.get(*group))
                .filter_map(Value::as_array)
                .flatten()
                .cloned()
                .collect();
            if !merged.is_empty() {
                map.insert("risk_factors".to_string(), Value::Array(merged));
            }
        }
    }

    if let Some(Value::Object(mut revenue)) = map.remove("revenue_optimization") {
        if let Some(upsell) = revenue.remove("upsell_opportunities") {
            map.entry("upsell_opportunities").or_insert(upsell);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locate_object_ignores_surrounding_prose() {
        let raw = "Sure! Here is the analysis:\n{\"business_priority\": \"high\"}\nLet me know.";
        let map = locate_object(raw).unwrap();
        assert_eq!(map["business_priority"], "high");
    }

    #[test]
    fn test_locate_object_spans_nested_braces() {
        let raw = "{\"a\": {\"b\": 1}} trailing";
        let map = locate_object(raw).unwrap();
        assert_eq!(map["a"]["b"], 1);
    }

    #[test]
    fn test_locate_object_without_braces() {
        assert!(matches!(locate_object("no json here"), Err(ParseError::NoObject)));
        assert!(matches!(locate_object("} backwards {"), Err(ParseError::NoObject)));
    }

    #[test]
    fn test_locate_object_invalid_json() {
        assert!(matches!(
            locate_object("{\"a\": 1,, }"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_flatten_business_intelligence_fills_missing_keys() {
        let map = json!({
            "overall_sentiment": 0.2,
            "business_intelligence": {
                "overall_sentiment": 0.9,
                "service_type": "wedding"
            }
        });
        let flat = flatten_nested(map.as_object().unwrap().clone());
        assert_eq!(flat["overall_sentiment"], 0.2);
        assert_eq!(flat["service_type"], "wedding");
        assert!(!flat.contains_key("business_intelligence"));
    }

    #[test]
    fn test_flatten_merges_risk_groups_in_order() {
        let map = json!({
            "risk_assessment": {
                "operational_risks": ["venue not confirmed"],
                "booking_risks": ["client comparing studios"],
                "financial_risks": ["tight budget"]
            },
            "revenue_optimization": {"upsell_opportunities": ["album"]}
        });
        let flat = flatten_nested(map.as_object().unwrap().clone());
        assert_eq!(
            flat["risk_factors"],
            json!(["client comparing studios", "tight budget", "venue not confirmed"])
        );
        assert_eq!(flat["upsell_opportunities"], json!(["album"]));
    }

    #[test]
    fn test_flatten_keeps_explicit_risk_factors() {
        let map = json!({
            "risk_factors": ["explicit"],
            "risk_assessment": {"booking_risks": ["nested"]}
        });
        let flat = flatten_nested(map.as_object().unwrap().clone());
        assert_eq!(flat["risk_factors"], json!(["explicit"]));
    }
}
