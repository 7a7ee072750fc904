//! Field deserializers that accept whatever shape the model produced.
//!
//! Models routinely emit `"85"` or `85.5` for an integer score, `null` for a
//! summary, or a list that mixes strings with objects. None of that should sink
//! the whole reply.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Clamps a number into `0..=100`; NaN and negatives become 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= 100.0 {
        100
    } else {
        value.round() as u8
    }
}

fn score_from_value(value: &Value) -> u8 {
    match value {
        Value::Number(n) => n.as_f64().map(clamp_score).unwrap_or(0),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map(clamp_score)
            .unwrap_or(0),
        _ => 0,
    }
}

/// Score in `0..=100` from a number or numeric string; anything else is 0.
pub fn score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(score_from_value(&value))
}

/// Non-negative number from a number or the leading number in a string ("5+ years").
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let n = match &value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(s).unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if n.is_finite() && n > 0.0 { n } else { 0.0 })
}

fn leading_number(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    rest[..end].trim_end_matches('.').parse().ok()
}

/// Text from a string, number or bool; `null` and containers become "".
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

pub(crate) fn text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// List of strings; a bare string becomes a one-item list, non-string items are skipped.
pub fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// A nested record; `null` or a value of the wrong shape becomes the default.
pub fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// List of records; items that fail to deserialize are dropped, a non-array is empty.
pub fn record_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
