//! Per-field domain checks. Each check returns `None` for a value outside the
//! field's domain; nothing is clamped.

use callintel_core::record::domain;
use serde_json::Value;
use std::str::FromStr;

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Checked<T> {
    Absent,
    Valid(T),
    Rejected,
}

impl<T> Checked<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Absent | Self::Rejected => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

fn check<T>(value: Option<&Value>, f: impl FnOnce(&Value) -> Option<T>) -> Checked<T> {
    match value {
        None | Some(Value::Null) => Checked::Absent,
        Some(v) => f(v).map_or(Checked::Rejected, Checked::Valid),
    }
}

/// JSON integers, or floats with a zero fractional part.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn in_range_int(value: &Value, (lo, hi): (i64, i64)) -> Option<u8> {
    let i = as_integer(value)?;
    if (lo..=hi).contains(&i) {
        u8::try_from(i).ok()
    } else {
        None
    }
}

pub fn sentiment(value: Option<&Value>) -> Checked<f64> {
    let (lo, hi) = domain::SENTIMENT;
    check(value, |v| {
        v.as_f64().filter(|f| f.is_finite() && (lo..=hi).contains(f))
    })
}

pub fn score(value: Option<&Value>) -> Checked<u8> {
    check(value, |v| in_range_int(v, domain::SCORE))
}

pub fn booking_probability(value: Option<&Value>) -> Checked<u8> {
    check(value, |v| in_range_int(v, domain::BOOKING_PROBABILITY))
}

pub fn flag(value: Option<&Value>) -> Checked<bool> {
    check(value, Value::as_bool)
}

pub fn revenue(value: Option<&Value>) -> Checked<f64> {
    check(value, |v| v.as_f64().filter(|f| f.is_finite() && *f >= 0.0))
}

/// Enum labels, case-insensitive.
pub fn label<T: FromStr>(value: Option<&Value>) -> Checked<T> {
    check(value, |v| v.as_str().and_then(|s| s.parse().ok()))
}

/// An array whose every element is a string. Blank entries are dropped and
/// the rest trimmed; any other shape is rejected as a whole.
pub fn string_list(value: Option<&Value>) -> Checked<Vec<String>> {
    check(value, |v| {
        let items = v.as_array()?;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let s = item.as_str()?.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
        }
        Some(out)
    })
}
