//! Single-target set and delete.
//!
//! Both operations work on a copy of the document, so the caller's value is
//! never touched and a failed edit leaves nothing half-written.
//!
//! Auto-vivification rules for `set`:
//! - a missing or `null` slot followed by a `Key` segment becomes `{}`;
//! - a missing or `null` slot followed by an `Index` segment becomes `[]`;
//! - an index past the end of an array pads it with `null` up to the index,
//!   adding at most [`MAX_ARRAY_PADDING`] elements; a larger gap is
//!   `MutationError::IndexOutOfRange`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{Path, Segment};
use crate::value::{get_mut_along, ValueType};

/// Most `null`s a single `set` may append to reach its index.
pub const MAX_ARRAY_PADDING: usize = 65_536;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MutationError {
    #[error("unsupported path: '{segment}' does not address a single location")]
    UnsupportedPath { segment: String },
    #[error("path conflict at segment {position}: cannot apply '{segment}' to {found}")]
    PathConflict {
        position: usize,
        segment: String,
        found: ValueType,
    },
    #[error("index {index} at segment {position} is too far past the end of the array (length {len})")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        len: usize,
    },
    #[error("cannot delete the document root")]
    RootTarget,
}

/// Return a copy of `root` with `value` stored at `path`.
pub fn set(root: &Value, path: &Path, value: Value) -> Result<Value, MutationError> {
    ensure_single_target(path)?;
    let mut doc = root.clone();
    set_in_place(&mut doc, &path.segments, 0, value)?;
    Ok(doc)
}

/// Return a copy of `root` without the value at `path`.
///
/// A path that does not exist leaves the document unchanged.
pub fn delete(root: &Value, path: &Path) -> Result<Value, MutationError> {
    ensure_single_target(path)?;
    let (last, parents) = path.segments.split_last().ok_or(MutationError::RootTarget)?;

    let mut doc = root.clone();
    let removed = match get_mut_along(&mut doc, parents) {
        Some(parent) => remove_child(parent, last),
        None => false,
    };
    if !removed {
        tracing::debug!(%path, "delete target not found, document unchanged");
    }
    Ok(doc)
}

fn ensure_single_target(path: &Path) -> Result<(), MutationError> {
    match path.segments.iter().find(|s| !s.is_single_step()) {
        Some(segment) => Err(MutationError::UnsupportedPath {
            segment: segment.to_string(),
        }),
        None => Ok(()),
    }
}

fn set_in_place(node: &mut Value, segments: &[Segment], depth: usize, value: Value) -> Result<(), MutationError> {
    let Some((segment, rest)) = segments.split_first() else {
        *node = value;
        return Ok(());
    };

    if node.is_null() {
        tracing::debug!(depth, %segment, "auto-vivifying container");
        *node = match segment {
            Segment::Index(_) => Value::Array(Vec::new()),
            _ => Value::Object(Map::new()),
        };
    }

    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            let slot = map.entry(key.clone()).or_insert(Value::Null);
            set_in_place(slot, rest, depth + 1, value)
        }
        (Segment::Index(index), Value::Object(map)) => {
            let slot = map.entry(index.to_string()).or_insert(Value::Null);
            set_in_place(slot, rest, depth + 1, value)
        }
        (Segment::Index(index), Value::Array(arr)) => {
            let index = *index;
            if index >= arr.len() {
                let new_len = index
                    .checked_add(1)
                    .filter(|new_len| new_len - arr.len() <= MAX_ARRAY_PADDING)
                    .ok_or(MutationError::IndexOutOfRange {
                        position: depth,
                        index,
                        len: arr.len(),
                    })?;
                arr.resize(new_len, Value::Null);
            }
            set_in_place(&mut arr[index], rest, depth + 1, value)
        }
        (segment, other) => Err(MutationError::PathConflict {
            position: depth,
            segment: segment.to_string(),
            found: ValueType::of(other),
        }),
    }
}

fn remove_child(parent: &mut Value, segment: &Segment) -> bool {
    match (segment, parent) {
        (Segment::Key(key), Value::Object(map)) => map.shift_remove(key).is_some(),
        (Segment::Index(index), Value::Object(map)) => map.shift_remove(&index.to_string()).is_some(),
        (Segment::Index(index), Value::Array(arr)) if *index < arr.len() => {
            arr.remove(*index);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PathParser;
    use serde_json::json;

    fn set_at(doc: &Value, path: &str, value: Value) -> Result<Value, MutationError> {
        set(doc, &PathParser::parse(path).unwrap(), value)
    }

    fn delete_at(doc: &Value, path: &str) -> Result<Value, MutationError> {
        delete(doc, &PathParser::parse(path).unwrap())
    }

    #[test]
    fn set_replaces_nested_value() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}]});
        let out = set_at(&doc, "items[0].id", json!(99)).unwrap();
        assert_eq!(out, json!({"items": [{"id": 99}, {"id": 2}]}));
        assert_eq!(doc, json!({"items": [{"id": 1}, {"id": 2}]}));
    }

    #[test]
    fn set_auto_vivifies() {
        let out = set_at(&json!({}), "a.b.0", json!(5)).unwrap();
        assert_eq!(out, json!({"a": {"b": [5]}}));

        let out = set_at(&json!({"a": null}), "a.2.x", json!(true)).unwrap();
        assert_eq!(out, json!({"a": [null, null, {"x": true}]}));
    }

    #[test]
    fn set_pads_arrays() {
        let out = set_at(&json!({"a": [1]}), "a.3", json!(4)).unwrap();
        assert_eq!(out, json!({"a": [1, null, null, 4]}));
    }

    #[test]
    fn set_rejects_huge_padding() {
        let doc = json!({"a": [1]});
        assert_eq!(
            set_at(&doc, "a.18446744073709551615", json!(1)),
            Err(MutationError::IndexOutOfRange {
                position: 1,
                index: usize::MAX,
                len: 1,
            })
        );
        assert!(matches!(
            set_at(&json!({}), "a.1000000000000.b", json!(1)),
            Err(MutationError::IndexOutOfRange { position: 1, len: 0, .. })
        ));

        let at_limit = set_at(&doc, &format!("a.{MAX_ARRAY_PADDING}"), json!(2)).unwrap();
        assert_eq!(at_limit["a"].as_array().unwrap().len(), MAX_ARRAY_PADDING + 1);
        assert!(set_at(&doc, &format!("a.{}", MAX_ARRAY_PADDING + 1), json!(2)).is_err());
    }

    #[test]
    fn set_keeps_key_order() {
        let doc = json!({"x": 1, "y": 2, "z": 3});
        let out = set_at(&doc, "y", json!(20)).unwrap();
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"{"x":1,"y":20,"z":3}"#);
        let out = set_at(&doc, "w", json!(0)).unwrap();
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"{"x":1,"y":2,"z":3,"w":0}"#);
    }

    #[test]
    fn set_through_scalar_conflicts() {
        let doc = json!({"a": 1, "arr": []});
        assert_eq!(
            set_at(&doc, "a.b", json!(2)),
            Err(MutationError::PathConflict {
                position: 1,
                segment: "b".into(),
                found: ValueType::Number,
            })
        );
        assert!(matches!(
            set_at(&doc, "arr.name", json!(2)),
            Err(MutationError::PathConflict { found: ValueType::Array, .. })
        ));
    }

    #[test]
    fn fan_out_paths_are_unsupported() {
        let doc = json!({"items": [1, 2]});
        for path in ["items.#", "items[?(@>1)]", "items.#@reverse"] {
            assert!(
                matches!(set_at(&doc, path, json!(0)), Err(MutationError::UnsupportedPath { .. })),
                "{path}"
            );
            assert!(
                matches!(delete_at(&doc, path), Err(MutationError::UnsupportedPath { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn delete_removes_key_preserving_order() {
        let doc = json!({"a": {"b": 1}, "c": 2, "d": 3});
        assert_eq!(delete_at(&doc, "a.b").unwrap(), json!({"a": {}, "c": 2, "d": 3}));
        let out = delete_at(&doc, "a").unwrap();
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"{"c":2,"d":3}"#);
    }

    #[test]
    fn delete_shifts_array_elements() {
        let doc = json!({"a": [1, 2, 3]});
        assert_eq!(delete_at(&doc, "a[0]").unwrap(), json!({"a": [2, 3]}));
    }

    #[test]
    fn delete_missing_is_noop() {
        let doc = json!({"a": [1], "b": "x"});
        for path in ["zz", "a.5", "b.c", "zz.yy.xx"] {
            assert_eq!(delete_at(&doc, path).unwrap(), doc, "{path}");
        }
    }

    #[test]
    fn empty_paths() {
        let doc = json!({"a": 1});
        assert_eq!(set(&doc, &Path::new(vec![]), json!(2)).unwrap(), json!(2));
        assert_eq!(delete(&doc, &Path::new(vec![])), Err(MutationError::RootTarget));
    }
}
