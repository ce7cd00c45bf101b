use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::tree::{Value, WalkError, WalkResult};

// Cheap shape check so identifier promotion does not run a full RFC 3339
// parse over every plain string.
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[Tt]\d{2}:\d{2}:\d{2}").unwrap());

/// Coercion rules shared by the walkers.
pub struct Coerce;

impl Coerce {
    /// Numeric view of a value. Only numbers qualify; numeric-looking
    /// strings stay strings.
    pub fn to_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Timestamp view of a value: a timestamp as-is, or a string holding a
    /// full RFC 3339 instant.
    pub fn to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Timestamp(t) => Some(*t),
            Value::String(s) => Self::parse_rfc3339(s),
            _ => None,
        }
    }

    pub fn parse_rfc3339(text: &str) -> Option<DateTime<Utc>> {
        if !DATE_SHAPE.is_match(text) {
            return None;
        }
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Resolve-time promotion: a looked-up string that parses as RFC 3339
    /// becomes a timestamp, so date columns stored as text compare as
    /// instants. Everything else passes through unchanged.
    pub fn promote(value: Value) -> Value {
        if let Value::String(s) = &value {
            if let Some(t) = Self::parse_rfc3339(s) {
                return Value::Timestamp(t);
            }
        }
        value
    }

    /// Ordering for `<`, `<=`, `>`, `>=`: both sides as numbers first, both
    /// sides as dates second, otherwise a type mismatch naming both kinds.
    pub fn compare(left: &Value, right: &Value) -> WalkResult<Ordering> {
        if let (Some(l), Some(r)) = (Self::to_number(left), Self::to_number(right)) {
            return Ok(l.partial_cmp(&r).unwrap_or_else(|| l.total_cmp(&r)));
        }
        if let (Some(l), Some(r)) = (Self::to_timestamp(left), Self::to_timestamp(right)) {
            return Ok(l.cmp(&r));
        }
        Err(WalkError::TypeMismatch {
            expected: "number or date".to_string(),
            got: format!("{} and {}", left.kind_name(), right.kind_name()),
        })
    }

    /// Translates a SQL `like` pattern into an anchored regular expression:
    /// `%` becomes `.*` and `_` becomes `.`. Remaining characters pass
    /// through untranslated, so a pattern holding regex metacharacters may
    /// fail to compile; callers treat that as a non-match.
    pub fn like_to_regex(pattern: &str) -> String {
        format!("^{}$", pattern.replace('%', ".*").replace('_', "."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_do_not_coerce_from_strings() {
        assert_eq!(Coerce::to_number(&Value::Number(5.5)), Some(5.5));
        assert_eq!(Coerce::to_number(&Value::from("5.5")), None);
        assert_eq!(Coerce::to_number(&Value::Boolean(true)), None);
    }

    #[test]
    fn timestamps_coerce_from_rfc3339_strings() {
        let t = Coerce::to_timestamp(&Value::from("2024-03-01T12:00:00Z")).unwrap();
        assert_eq!(t.to_rfc3339(), "2024-03-01T12:00:00+00:00");

        // offsets normalize to the same instant
        let shifted = Coerce::to_timestamp(&Value::from("2024-03-01T14:00:00+02:00")).unwrap();
        assert_eq!(t, shifted);

        assert_eq!(Coerce::to_timestamp(&Value::from("2024-03-01")), None);
        assert_eq!(Coerce::to_timestamp(&Value::from("not a date")), None);
    }

    #[test]
    fn promote_only_touches_full_instants() {
        let promoted = Coerce::promote(Value::from("2024-03-01T12:00:00Z"));
        assert_eq!(promoted.kind_name(), "timestamp");

        let untouched = Coerce::promote(Value::from("2024-03-01"));
        assert_eq!(untouched, Value::from("2024-03-01"));

        let number = Coerce::promote(Value::Number(7.0));
        assert_eq!(number, Value::Number(7.0));
    }

    #[test]
    fn compare_tries_numbers_then_dates() {
        assert_eq!(
            Coerce::compare(&Value::Number(1.0), &Value::Number(2.0)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Coerce::compare(
                &Value::from("2024-03-01T12:00:00Z"),
                &Value::from("2024-03-01T11:00:00Z"),
            )
            .unwrap(),
            Ordering::Greater
        );

        let err = Coerce::compare(&Value::from("abc"), &Value::Number(1.0)).unwrap_err();
        assert_eq!(
            err,
            WalkError::TypeMismatch {
                expected: "number or date".to_string(),
                got: "string and number".to_string(),
            }
        );
    }

    #[test]
    fn like_translation_keeps_metacharacters_raw() {
        assert_eq!(Coerce::like_to_regex("jo%"), "^jo.*$");
        assert_eq!(Coerce::like_to_regex("j_e"), "^j.e$");
        // no escaping: a bracket pattern stays a bracket pattern
        assert_eq!(Coerce::like_to_regex("a[%"), "^a[.*$");
    }
}
