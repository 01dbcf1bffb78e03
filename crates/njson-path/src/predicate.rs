//! Filter predicate evaluation.
//!
//! A predicate never fails: a field that does not resolve, or a comparison
//! between incompatible types, simply evaluates to `false`.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::*;
use crate::value::get_field;

/// Evaluate `predicate` against one candidate element.
pub fn evaluate(predicate: &Predicate, candidate: &Value, mode: RegexMatch) -> bool {
    match resolve_field(candidate, &predicate.field) {
        Some(field) => compare(predicate.operator, field, &predicate.literal, mode),
        None => false,
    }
}

fn resolve_field<'a>(candidate: &'a Value, steps: &[FieldStep]) -> Option<&'a Value> {
    steps.iter().try_fold(candidate, |current, step| get_field(current, step))
}

fn compare(operator: ComparisonOperator, left: &Value, right: &Literal, mode: RegexMatch) -> bool {
    match operator {
        ComparisonOperator::Matches => match (left, right) {
            (Value::String(text), Literal::Pattern(pattern)) => pattern.is_match(text, mode),
            _ => false,
        },
        ComparisonOperator::Equal => equals(left, right).unwrap_or(false),
        ComparisonOperator::NotEqual => equals(left, right).map(|eq| !eq).unwrap_or(false),
        ComparisonOperator::Less => order(left, right) == Some(Ordering::Less),
        ComparisonOperator::LessEqual => {
            matches!(order(left, right), Some(Ordering::Less | Ordering::Equal))
        }
        ComparisonOperator::Greater => order(left, right) == Some(Ordering::Greater),
        ComparisonOperator::GreaterEqual => {
            matches!(order(left, right), Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// `None` when the two sides are not comparable.
fn equals(left: &Value, right: &Literal) -> Option<bool> {
    match (left, right) {
        (Value::Null, Literal::Null) => Some(true),
        (Value::Bool(a), Literal::Bool(b)) => Some(a == b),
        (Value::Number(a), Literal::Number(b)) => a.as_f64().map(|a| a == *b),
        (Value::String(a), Literal::String(b)) => Some(a == b),
        _ => None,
    }
}

/// Numeric ordering only.
fn order(left: &Value, right: &Literal) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Literal::Number(b)) => a.as_f64()?.partial_cmp(b),
        _ => None,
    }
}
