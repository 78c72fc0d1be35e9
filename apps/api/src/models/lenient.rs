//! Tolerant deserializers for model-produced JSON.
//!
//! The model regularly answers `"description": "one line"` where a list is
//! expected, or `"gpa": 3.8` where a string is expected.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Converts a JSON value into a list of strings: a list keeps its scalar
/// items, a scalar becomes a one-item list, null becomes empty.
pub fn value_to_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// `Vec<String>` field accepting a string, a list, or null.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.map(value_to_list).unwrap_or_default())
}

/// `String` field accepting a string, a number, or a list (joined with spaces).
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None => String::new(),
        Some(value) => value_to_list(value).join(" "),
    })
}

/// `Option<String>` field with the same inputs as [`text`]; blanks become `None`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| value_to_list(value).join(" "))
        .filter(|joined| !joined.is_empty()))
}
