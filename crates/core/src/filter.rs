//! Attribute-equality filtering of result collections.
//!
//! A filter expression is one or more `key=value` pairs joined by `+`.
//! Every pair must match for an entry to survive (implicit AND); there is no
//! OR or negation. A pair naming an attribute the entries do not have is an
//! error, not a silent mismatch.

use serde_json::Value;

use crate::error::ApiError;

/// Parse `key1=value1+key2=value2+...` into pairs.
pub fn parse_filter(expr: &str) -> Result<Vec<(String, String)>, ApiError> {
    let mut pairs = Vec::new();
    for part in expr.split('+') {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "malformed filter pair '{part}': expected name=value"
            ))
        })?;
        if key.is_empty() {
            return Err(ApiError::InvalidInput(format!(
                "malformed filter pair '{part}': empty attribute name"
            )));
        }
        pairs.push((key.to_string(), value.to_string()));
    }
    Ok(pairs)
}

/// Whether `entry` satisfies every pair.
///
/// Comparison is by string equality against the attribute's scalar
/// rendering. A missing attribute is `Err(UnknownFilterField)`.
pub fn entry_matches(entry: &Value, pairs: &[(String, String)]) -> Result<bool, ApiError> {
    for (key, wanted) in pairs {
        let attr = entry.get(key).ok_or_else(|| {
            ApiError::UnknownFilterField(format!(
                "no attribute named '{key}' in the filtered results"
            ))
        })?;
        if scalar_text(attr) != *wanted {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Apply a filter expression to a collection of JSON entries.
///
/// The empty result is a success, not an error.
pub fn filter_entries(entries: Vec<Value>, expr: &str) -> Result<Vec<Value>, ApiError> {
    let pairs = parse_filter(expr)?;
    let mut kept = Vec::new();
    for entry in entries {
        if entry_matches(&entry, &pairs)? {
            kept.push(entry);
        }
    }
    Ok(kept)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
