//! Path AST types.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object member by name: `user`, `["first name"]`
    Key(String),
    /// Array element by position: `.1`, `[1]`
    Index(usize),
    /// Every element of an array: `#`
    Wildcard,
    /// Keeps the elements matching a predicate: `[?(@.price>25)]`
    Filter(Predicate),
    /// Transforms the whole result sequence: `#@reverse`, `#@name:arg`
    Modifier { name: String, arg: Option<String> },
}

impl Segment {
    /// Whether this segment addresses exactly one child (`Key` or `Index`).
    pub fn is_single_step(&self) -> bool {
        matches!(self, Segment::Key(_) | Segment::Index(_))
    }

    /// Whether this segment turns one value into many.
    pub fn is_fan_out(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

/// Complete path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Segments, applied left to right.
    pub segments: Vec<Segment>,
}

impl Path {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Whether evaluation produces a sequence rather than a single value.
    pub fn has_fan_out(&self) -> bool {
        self.segments.iter().any(Segment::is_fan_out)
    }

    /// Whether the path denotes exactly one concrete location.
    pub fn is_single_target(&self) -> bool {
        self.segments.iter().all(Segment::is_single_step)
    }
}

/// A step of a predicate's field path. Only keys and indices are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldStep {
    Key(String),
    Index(usize),
}

/// Filter expression: `@.field OP literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field path relative to the candidate; empty means the candidate itself.
    pub field: Vec<FieldStep>,
    pub operator: ComparisonOperator,
    pub literal: Literal,
}

impl Predicate {
    pub fn new(field: Vec<FieldStep>, operator: ComparisonOperator, literal: Literal) -> Self {
        Self { field, operator, literal }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Matches,      // =~
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
            ComparisonOperator::Matches => "=~",
        }
    }

    /// Whether the operator only applies to numbers.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::Less
                | ComparisonOperator::LessEqual
                | ComparisonOperator::Greater
                | ComparisonOperator::GreaterEqual
        )
    }
}

/// Predicate literal, resolved once at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Compiled right-hand side of `=~`.
    Pattern(Pattern),
}

/// A regular expression literal compiled for both match modes.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    search: Regex,
    full: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let search = Regex::new(source)?;
        let full = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            search,
            full,
        })
    }

    /// The pattern text as written in the path.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str, mode: RegexMatch) -> bool {
        match mode {
            RegexMatch::Search => self.search.is_match(text),
            RegexMatch::Full => self.full.is_match(text),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// How `=~` applies its pattern to a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegexMatch {
    /// The pattern may match anywhere in the string.
    #[default]
    Search,
    /// The pattern must match the whole string.
    Full,
}
