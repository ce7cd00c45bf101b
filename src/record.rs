use serde_json::{Map, Value as Json};

use crate::tree::{Node, Value, WalkResult};
use crate::walkers::semantics;

/// A JSON object acting as the evaluation subject of a tree.
///
/// Field access tries the flat key first, then walks dotted segments into
/// nested objects, so `details.age` finds both a literal `"details.age"`
/// key and `{"details": {"age": ...}}`. Fields holding objects have no
/// scalar representation and read as absent.
#[derive(Debug, Clone)]
pub struct Record(pub Map<String, Json>);

impl Record {
    pub fn new(fields: Map<String, Json>) -> Self {
        Record(fields)
    }

    /// Wraps a JSON value, which must be an object.
    pub fn from_json(value: Json) -> Option<Self> {
        match value {
            Json::Object(fields) => Some(Record(fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(field) = self.0.get(key) {
            return Value::from_json(field);
        }
        self.get_nested(key)
    }

    fn get_nested(&self, key: &str) -> Option<Value> {
        let mut segments = key.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Value::from_json(current)
    }

    /// Evaluates a tree against this record.
    pub fn eval(&self, tree: &Node) -> WalkResult<Value> {
        semantics::walk(tree, |key| self.get(key))
    }

    /// Evaluates a tree and reads the result as a match/no-match answer.
    /// Anything but a boolean result is a type mismatch.
    pub fn matches(&self, tree: &Node) -> WalkResult<bool> {
        let value = self.eval(tree)?;
        value
            .as_bool()
            .ok_or_else(|| crate::tree::WalkError::mismatch("boolean", &value))
    }

    pub fn into_json(self) -> Json {
        Json::Object(self.0)
    }
}

impl From<Map<String, Json>> for Record {
    fn from(fields: Map<String, Json>) -> Self {
        Record(fields)
    }
}
