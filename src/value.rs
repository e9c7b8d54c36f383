use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value held by the grid.
///
/// Cells are stored as one of three shapes: plain text, a sequence of
/// strings, or a string-to-string mapping. The persistence format is
/// line-oriented text, so [`retrieve`](crate::engine::Persistence::retrieve)
/// only ever produces the [`Value::Str`] variant; structured variants
/// survive as their canonical rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain text.
    Str(String),
    /// A sequence of strings, rendered as `a, b, c`.
    Seq(Vec<String>),
    /// A string mapping, rendered as `k1:v1, k2:v2` in key order.
    Map(BTreeMap<String, String>),
}

impl Value {
    /// An empty-string cell, the default used to pad short rows and columns.
    pub fn empty() -> Self {
        Value::Str(String::new())
    }

    /// Parses `input` as JSON and maps it onto a value: a string, an array
    /// of strings, or a string-to-string object become the matching
    /// variant. Anything else, including invalid JSON, is taken as raw text.
    pub fn from_json(input: &str) -> Self {
        serde_json::from_str(input).unwrap_or_else(|_| Value::Str(input.to_string()))
    }
}

/// The canonical string form, used for both persistence and display.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Seq(items) => f.write_str(&items.join(", ")),
            Value::Map(entries) => {
                let pairs: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                f.write_str(&pairs.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Seq(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::Seq(items.into_iter().map(str::to_string).collect())
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Value::Map(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_display() {
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::empty().to_string(), "");
    }

    #[test]
    fn test_seq_display() {
        let v = Value::from(vec!["a", "b", "c"]);
        assert_eq!(v.to_string(), "a, b, c");
    }

    #[test]
    fn test_map_display_is_key_ordered() {
        let mut m = BTreeMap::new();
        m.insert("b".to_string(), "2".to_string());
        m.insert("a".to_string(), "1".to_string());
        assert_eq!(Value::Map(m).to_string(), "a:1, b:2");
    }

    #[test]
    fn test_from_json_variants() {
        assert_eq!(Value::from_json("\"text\""), Value::from("text"));
        assert_eq!(Value::from_json("[\"x\",\"y\"]"), Value::from(vec!["x", "y"]));

        let parsed = Value::from_json("{\"k\":\"v\"}");
        let mut expected = BTreeMap::new();
        expected.insert("k".to_string(), "v".to_string());
        assert_eq!(parsed, Value::Map(expected));
    }

    #[test]
    fn test_from_json_falls_back_to_raw_text() {
        // Not valid JSON strings/arrays/objects of strings: keep the raw input.
        assert_eq!(Value::from_json("plain"), Value::from("plain"));
        assert_eq!(Value::from_json("42"), Value::from("42"));
        assert_eq!(Value::from_json("[1, 2]"), Value::from("[1, 2]"));
    }
}
