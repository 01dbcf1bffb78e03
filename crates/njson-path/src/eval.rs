//! Path evaluator.

use std::borrow::Cow;

use serde_json::Value;

use crate::modifier::{ModifierError, ModifierRegistry};
use crate::predicate;
use crate::types::*;
use crate::value::{get_index, get_key, ValueType};

/// Evaluation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// How `=~` applies its pattern.
    pub regex_match: RegexMatch,
}

/// Result of evaluating a path against a document.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    /// `false` when some segment failed to resolve (missing key, index out of
    /// range, wildcard over a non-array).
    pub exists: bool,
    /// The matched values, in document order unless a modifier reordered them.
    pub values: Vec<&'a Value>,
    /// Whether the path fans out; a fanned-out result is always a sequence.
    pub fan_out: bool,
}

impl<'a> QueryResult<'a> {
    fn not_found(fan_out: bool) -> Self {
        Self {
            exists: false,
            values: Vec::new(),
            fan_out,
        }
    }

    /// The result as one JSON value: the single match, or an array of all
    /// matches when the path fans out.
    pub fn value(&self) -> Option<Cow<'a, Value>> {
        if !self.exists {
            return None;
        }
        if self.fan_out {
            let items = self.values.iter().map(|v| (*v).clone()).collect();
            return Some(Cow::Owned(Value::Array(items)));
        }
        self.values.first().map(|v| Cow::Borrowed(*v))
    }

    /// Type tag of [`value`](Self::value).
    pub fn value_type(&self) -> Option<ValueType> {
        if !self.exists {
            return None;
        }
        if self.fan_out {
            return Some(ValueType::Array);
        }
        self.values.first().map(|v| ValueType::of(v))
    }
}

/// Path evaluator.
#[derive(Debug, Clone, Copy)]
pub struct PathEval<'r> {
    modifiers: &'r ModifierRegistry,
    options: EvalOptions,
}

impl Default for PathEval<'static> {
    fn default() -> Self {
        Self::new(ModifierRegistry::standard(), EvalOptions::default())
    }
}

impl<'r> PathEval<'r> {
    pub fn new(modifiers: &'r ModifierRegistry, options: EvalOptions) -> Self {
        Self { modifiers, options }
    }

    /// Evaluate a path against a JSON document.
    ///
    /// Only modifier problems are errors; anything that does not resolve
    /// narrows the result instead.
    pub fn get<'a>(&self, root: &'a Value, path: &Path) -> Result<QueryResult<'a>, ModifierError> {
        // Modifiers are validated up front so a bad one fails even when the
        // walk stops early.
        for segment in &path.segments {
            if let Segment::Modifier { name, arg } = segment {
                self.modifiers.check(name, arg.as_deref())?;
            }
        }

        let fan_out = path.has_fan_out();
        let mut current: Vec<&'a Value> = vec![root];

        for (depth, segment) in path.segments.iter().enumerate() {
            let had_input = !current.is_empty();
            current = match segment {
                Segment::Key(key) => current.into_iter().filter_map(|v| get_key(v, key)).collect(),
                Segment::Index(index) => current
                    .into_iter()
                    .filter_map(|v| get_index(v, *index))
                    .collect(),
                Segment::Wildcard => {
                    if had_input && !current.iter().any(|v| v.is_array()) {
                        tracing::trace!(depth, "wildcard over non-array values");
                        return Ok(QueryResult::not_found(fan_out));
                    }
                    current
                        .into_iter()
                        .filter_map(Value::as_array)
                        .flat_map(|arr| arr.iter())
                        .collect()
                }
                Segment::Filter(pred) => current
                    .into_iter()
                    .filter(|v| predicate::evaluate(pred, v, self.options.regex_match))
                    .collect(),
                Segment::Modifier { name, arg } => {
                    self.modifiers.apply(name, arg.as_deref(), current)?
                }
            };

            // Steps after a set that is already empty (empty array, filter
            // that kept nothing) leave the path existing with no values.
            if had_input && current.is_empty() && segment.is_single_step() {
                tracing::trace!(depth, "segment did not resolve");
                return Ok(QueryResult::not_found(fan_out));
            }
        }

        Ok(QueryResult {
            exists: true,
            values: current,
            fan_out,
        })
    }
}
