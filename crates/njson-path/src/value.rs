//! Type tags and single-step navigation over `serde_json::Value`.
//!
//! Documents are plain `serde_json::Value`s built with `preserve_order`, so
//! object members keep their insertion order through every round trip.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldStep, Segment};

/// Type tag of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ValueType::Array | ValueType::Object)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object member by name.
pub fn get_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        _ => None,
    }
}

/// Array element by position.
///
/// On an object, falls back to the member named by the index's decimal text.
pub fn get_index(value: &Value, index: usize) -> Option<&Value> {
    match value {
        Value::Array(arr) => arr.get(index),
        Value::Object(map) => map.get(&index.to_string()),
        _ => None,
    }
}

pub(crate) fn get_field<'a>(value: &'a Value, step: &FieldStep) -> Option<&'a Value> {
    match step {
        FieldStep::Key(key) => get_key(value, key),
        FieldStep::Index(index) => get_index(value, *index),
    }
}

/// Mutable navigation along `Key`/`Index` segments (must exist).
pub(crate) fn get_mut_along<'a>(value: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    let mut current = value;
    for segment in segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get_mut(key)?,
            (Segment::Index(index), Value::Array(arr)) => arr.get_mut(*index)?,
            (Segment::Index(index), Value::Object(map)) => map.get_mut(&index.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_tags() {
        assert_eq!(ValueType::of(&json!(null)), ValueType::Null);
        assert_eq!(ValueType::of(&json!(true)), ValueType::Boolean);
        assert_eq!(ValueType::of(&json!(30)), ValueType::Number);
        assert_eq!(ValueType::of(&json!("30")), ValueType::String);
        assert_eq!(ValueType::of(&json!([])), ValueType::Array);
        assert_eq!(ValueType::of(&json!({})), ValueType::Object);
        assert_eq!(ValueType::Boolean.to_string(), "boolean");
    }

    #[test]
    fn index_falls_back_to_numeric_key_on_objects() {
        let doc = json!({"1": "one"});
        assert_eq!(get_index(&doc, 1), Some(&json!("one")));
        assert_eq!(get_index(&doc, 0), None);
        assert_eq!(get_index(&json!("str"), 0), None);
    }

    #[test]
    fn mutable_navigation() {
        let mut doc = json!({"a": [{"b": 1}]});
        let segments = vec![Segment::Key("a".into()), Segment::Index(0), Segment::Key("b".into())];
        *get_mut_along(&mut doc, &segments).unwrap() = json!(2);
        assert_eq!(doc, json!({"a": [{"b": 2}]}));
        assert!(get_mut_along(&mut doc, &[Segment::Key("zz".into())]).is_none());
        assert!(get_mut_along(&mut doc, &[Segment::Wildcard]).is_none());
    }
}
