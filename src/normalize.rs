//! Lenient accessors over raw search hits.
//!
//! The index is loosely typed: any attribute may be missing, `null`, or of the
//! wrong JSON type. Every accessor here returns a usable value and never
//! fails, so decoded records are always safe to render.

use serde_json::Value;

/// Fallback shown when a destination has no usable name
pub const UNNAMED_DESTINATION: &str = "Unnamed Destination";

/// Lower and upper bound of the 0-10 score scales
pub const SCORE_RANGE: (f64, f64) = (0.0, 10.0);

/// Midpoint used when a score feeding a visual meter is missing
pub const SCORE_MIDPOINT: f64 = 5.0;

static MISSING: Value = Value::Null;

fn field<'a>(hit: &'a Value, key: &str) -> Option<&'a Value> {
    hit.as_object().and_then(|obj| obj.get(key))
}

/// String attribute, or empty string
#[must_use]
pub fn text(hit: &Value, key: &str) -> String {
    text_or(hit, key, "")
}

/// String attribute, or `fallback` when missing, non-string or blank
#[must_use]
pub fn text_or(hit: &Value, key: &str, fallback: &str) -> String {
    match field(hit, key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// Identifier-like attribute; numbers are stringified
#[must_use]
pub fn identifier(hit: &Value, key: &str) -> String {
    match field(hit, key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Finite numeric attribute. Numeric strings are accepted; anything else
/// (missing, NaN, infinite, wrong type) yields `fallback`.
#[must_use]
pub fn number_or(hit: &Value, key: &str, fallback: f64) -> f64 {
    let parsed = match field(hit, key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(fallback)
}

/// Score on the 0-10 scale, clamped
#[must_use]
pub fn score_or(hit: &Value, key: &str, fallback: f64) -> f64 {
    number_or(hit, key, fallback).clamp(SCORE_RANGE.0, SCORE_RANGE.1)
}

/// Non-negative quantity
#[must_use]
pub fn non_negative(hit: &Value, key: &str) -> f64 {
    number_or(hit, key, 0.0).max(0.0)
}

/// Boolean attribute; only a real JSON `true` counts
#[must_use]
pub fn flag(hit: &Value, key: &str) -> bool {
    matches!(field(hit, key), Some(Value::Bool(true)))
}

/// Ordered list of strings. Non-array values give an empty list and
/// non-string or blank elements are skipped.
#[must_use]
pub fn string_list(hit: &Value, key: &str) -> Vec<String> {
    match field(hit, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Ordered list of nested objects; non-object elements are skipped
#[must_use]
pub fn object_list<'a>(hit: &'a Value, key: &str) -> Vec<&'a Value> {
    match field(hit, key) {
        Some(Value::Array(items)) => items.iter().filter(|item| item.is_object()).collect(),
        _ => Vec::new(),
    }
}

/// Nested object, or `Value::Null` which every accessor treats as empty
#[must_use]
pub fn nested<'a>(hit: &'a Value, key: &str) -> &'a Value {
    match field(hit, key) {
        Some(value @ Value::Object(_)) => value,
        _ => &MISSING,
    }
}
