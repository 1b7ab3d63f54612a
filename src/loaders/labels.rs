//! Field extraction from raw series.
//!
//! All functions here are pure and tolerate missing or misnamed fields.

use serde_json::Value;
use std::collections::HashMap;

use crate::loaders::profile::EntityProfile;
use crate::services::metric_api::RawSeries;

const NIL_LIKE: &[&str] = &["<nil>", "nil", "null", "undefined", "none"];

/// Renders a label value as trimmed text. Nulls, arrays and objects render empty.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Reads a number from a JSON number or a numeric string.
pub fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// `true` for text that spells out "no value".
pub fn is_nil_like(text: &str) -> bool {
    let text = text.trim();
    NIL_LIKE.iter().any(|nil| text.eq_ignore_ascii_case(nil))
}

/// First candidate whose label renders non-empty.
pub fn first_non_empty(labels: &HashMap<String, Value>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|field| labels.get(*field))
        .map(label_text)
        .find(|text| !text.is_empty())
}

/// First candidate whose label parses as a number.
pub fn first_number(labels: &HashMap<String, Value>, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|field| labels.get(*field))
        .find_map(as_f64)
}

/// The entity code of a series, or an empty string when none is present.
pub fn extract_key(labels: &HashMap<String, Value>, profile: &EntityProfile) -> String {
    first_non_empty(labels, profile.key_fields).unwrap_or_default()
}

/// The display name of a series, falling back to `key`.
///
/// Nil-like names are skipped so they never displace the key placeholder.
pub fn extract_display_name(
    labels: &HashMap<String, Value>,
    key: &str,
    profile: &EntityProfile,
) -> String {
    profile
        .name_fields
        .iter()
        .filter_map(|field| labels.get(*field))
        .map(label_text)
        .find(|text| !text.is_empty() && !is_nil_like(text))
        .unwrap_or_else(|| key.to_string())
}

/// The last numeric sample of a series, or `0.0` if it has none.
pub fn extract_latest_value(series: &RawSeries) -> f64 {
    series.values.iter().rev().find_map(as_f64).unwrap_or(0.0)
}
