//! AST construction helpers.

use crate::types::*;

/// Helper functions for constructing path AST nodes.
pub struct Ast;

impl Ast {
    /// Create a path from segments.
    pub fn path(segments: Vec<Segment>) -> Path {
        Path::new(segments)
    }

    /// Create a key segment.
    pub fn key(name: impl Into<String>) -> Segment {
        Segment::Key(name.into())
    }

    /// Create an index segment.
    pub fn index(index: usize) -> Segment {
        Segment::Index(index)
    }

    /// Create a wildcard segment.
    pub fn wildcard() -> Segment {
        Segment::Wildcard
    }

    /// Create a filter segment.
    pub fn filter(predicate: Predicate) -> Segment {
        Segment::Filter(predicate)
    }

    /// Create a modifier segment.
    pub fn modifier(name: impl Into<String>, arg: Option<&str>) -> Segment {
        Segment::Modifier {
            name: name.into(),
            arg: arg.map(str::to_string),
        }
    }

    /// Create a predicate.
    pub fn predicate(field: Vec<FieldStep>, operator: ComparisonOperator, literal: Literal) -> Predicate {
        Predicate::new(field, operator, literal)
    }

    /// Create a `=~` predicate, compiling the pattern.
    pub fn matches(field: Vec<FieldStep>, pattern: &str) -> Result<Predicate, regex::Error> {
        Ok(Predicate::new(
            field,
            ComparisonOperator::Matches,
            Literal::Pattern(Pattern::new(pattern)?),
        ))
    }
}
