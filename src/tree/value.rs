use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Runtime value produced while resolving identifiers and evaluating
/// expression trees.
///
/// Every numeric value is an `f64`. Integers coming from documents or
/// literals are widened on entry, so `5` and `5.0` are the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// An unresolved field name. Only shows up when a lookup chooses to
    /// return one; the built-in walkers treat it as an opaque non-scalar.
    Identifier(String),
    Number(f64),
    String(String),
    Boolean(bool),
    /// A point in time, always normalized to UTC.
    Timestamp(DateTime<Utc>),
    Null,
    Array(Vec<Value>),
}

impl Value {
    /// Human readable kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Identifier(_) => "identifier",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Null => "null",
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value into a [`Value`].
    ///
    /// Strings stay strings here; date promotion happens at identifier
    /// resolution, not at conversion. Objects (and arrays containing
    /// objects) have no representation and yield `None`.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            serde_json::Value::Object(_) => None,
        }
    }

    /// Converts this value into JSON. Timestamps become RFC 3339 strings
    /// and identifiers degrade to their name.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Identifier(name) => serde_json::Value::String(name.clone()),
            Value::Number(n) => serde_json::json!(n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Timestamp(t) => {
                serde_json::Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Null => serde_json::Value::Null,
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Identifier(name) => write!(f, "{}", name),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn equality_is_structural_within_a_kind() {
        assert_eq!(Value::Number(5.0), Value::Number(5.0));
        assert_eq!(Value::from("joe"), Value::from("joe"));
        assert_ne!(Value::Number(5.0), Value::Number(5.5));
    }

    #[test]
    fn equality_across_kinds_is_false_not_an_error() {
        assert_ne!(Value::Number(5.0), Value::from("5"));
        assert_ne!(Value::Boolean(true), Value::from("true"));
        assert_ne!(Value::Null, Value::from(""));
    }

    #[test]
    fn timestamps_compare_as_instants() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let shifted = DateTime::parse_from_rfc3339("2024-03-01T14:00:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Value::Timestamp(utc), Value::Timestamp(shifted));
    }

    #[test]
    fn from_json_widens_integers() {
        let v = Value::from_json(&serde_json::json!(5)).unwrap();
        assert_eq!(v, Value::Number(5.0));
    }

    #[test]
    fn from_json_rejects_objects_anywhere() {
        assert_eq!(Value::from_json(&serde_json::json!({"a": 1})), None);
        assert_eq!(Value::from_json(&serde_json::json!([1, {"a": 1}])), None);
    }

    #[test]
    fn display_uses_query_syntax() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::Array(vec![Value::Number(1.0), Value::from("a")]).to_string(),
            "(1, 'a')"
        );
    }

    #[test]
    fn fractional_timestamps_render_without_losing_precision() {
        let t = DateTime::parse_from_rfc3339("2024-03-01T12:00:00.500Z")
            .unwrap()
            .with_timezone(&Utc);
        let v = Value::Timestamp(t);
        assert_eq!(v.to_string(), "2024-03-01T12:00:00.500Z");
        assert_eq!(v.to_json(), serde_json::json!("2024-03-01T12:00:00.500Z"));

        // whole seconds keep the short form
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(Value::Timestamp(t).to_string(), "2024-03-01T12:00:00Z");
    }

    #[test]
    fn kind_names_cover_every_variant() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let all = [
            (Value::Identifier("a".into()), "identifier"),
            (Value::Number(1.0), "number"),
            (Value::from("x"), "string"),
            (Value::Boolean(false), "boolean"),
            (Value::Timestamp(utc), "timestamp"),
            (Value::Null, "null"),
            (Value::Array(vec![]), "array"),
        ];
        for (value, name) in all {
            assert_eq!(value.kind_name(), name);
        }
    }
}
