//! Path utility helpers.

use std::fmt;

use crate::parser::is_key_char;
use crate::types::{ComparisonOperator, FieldStep, Literal, Path, Predicate, Segment};

/// Convert a path AST to its canonical text.
///
/// Indices use bracket form and filters hide the wildcard they imply, so the
/// output parses back to an equal AST for any path the parser produced.
///
/// Quoted text has no escape sequences. A key or string literal holding both
/// `'` and `"` cannot be written back and its rendering will not parse.
pub fn path_to_string(path: &Path) -> String {
    let mut out = String::new();
    let segments = &path.segments;

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Key(key) => {
                if is_plain_key(key) {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(key);
                } else {
                    out.push_str(&quote_key(key));
                }
            }
            Segment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
            Segment::Wildcard => {
                if matches!(segments.get(i + 1), Some(Segment::Filter(_))) {
                    continue;
                }
                if i > 0 {
                    out.push('.');
                }
                out.push('#');
            }
            Segment::Filter(predicate) => out.push_str(&filter_to_string(predicate)),
            Segment::Modifier { .. } => {
                // A chain starts with `#`; after a key or index it also needs the dot.
                match i.checked_sub(1).map(|prev| &segments[prev]) {
                    Some(Segment::Wildcard | Segment::Modifier { .. }) => {}
                    Some(Segment::Filter(_)) => out.push('#'),
                    Some(_) => out.push_str(".#"),
                    None => out.push('#'),
                }
                out.push_str(&segment.to_string());
            }
        }
    }

    out
}

/// Compare two path ASTs for structural equality.
pub fn path_equals(path1: &Path, path2: &Path) -> bool {
    path1 == path2
}

/// Return every object key the path names, including those inside filters.
pub fn get_accessed_keys(path: &Path) -> Vec<String> {
    let mut keys = Vec::new();

    for segment in &path.segments {
        match segment {
            Segment::Key(key) => keys.push(key.clone()),
            Segment::Filter(predicate) => {
                for step in &predicate.field {
                    if let FieldStep::Key(key) = step {
                        keys.push(key.clone());
                    }
                }
            }
            _ => {}
        }
    }

    keys
}

fn filter_to_string(predicate: &Predicate) -> String {
    let mut s = String::from("[?(@");
    for step in &predicate.field {
        match step {
            FieldStep::Key(key) if is_plain_key(key) => {
                s.push('.');
                s.push_str(key);
            }
            FieldStep::Key(key) => s.push_str(&quote_key(key)),
            FieldStep::Index(index) => {
                s.push('[');
                s.push_str(&index.to_string());
                s.push(']');
            }
        }
    }
    s.push_str(predicate.operator.as_str());
    s.push_str(&predicate.literal.to_string());
    s.push_str(")]");
    s
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char) && !key.bytes().all(|b| b.is_ascii_digit())
}

fn quote_key(key: &str) -> String {
    format!("[{}]", quote_text(key))
}

fn quote_text(text: &str) -> String {
    if text.contains('"') {
        format!("'{text}'")
    } else {
        format!("\"{text}\"")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&path_to_string(self))
    }
}

/// A segment on its own, as used in error messages.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) if is_plain_key(key) => f.write_str(key),
            Segment::Key(key) => f.write_str(&quote_key(key)),
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Wildcard => f.write_str("#"),
            Segment::Filter(predicate) => f.write_str(&filter_to_string(predicate)),
            Segment::Modifier { name, arg: Some(arg) } => write!(f, "@{name}:{arg}"),
            Segment::Modifier { name, arg: None } => write!(f, "@{name}"),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => f.write_str(&quote_text(s)),
            Literal::Pattern(p) => f.write_str(&quote_text(p.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::parser::PathParser;

    #[test]
    fn stringify_canonical_forms() {
        let cases = [
            ("a.b.c", "a.b.c"),
            ("a.0", "a[0]"),
            ("a[0].b", "a[0].b"),
            ("a.#.b", "a.#.b"),
            ("a.#@reverse", "a.#@reverse"),
            ("a[?(@.f == 2)]", "a[?(@.f==2)]"),
            ("a.#[?(@.f=~\"x\")].g", "a[?(@.f=~\"x\")].g"),
            ("[0].a", "[0].a"),
            ("#", "#"),
            ("[\"first name\"]", "[\"first name\"]"),
        ];
        for (input, expected) in cases {
            let path = PathParser::parse(input).unwrap();
            assert_eq!(path_to_string(&path), expected, "{input}");
            assert_eq!(PathParser::parse(expected).unwrap(), path, "{input}");
        }
    }

    #[test]
    fn modifiers_after_fan_out_round_trip() {
        for text in [
            "items.#.id.#@reverse",
            "items[?(@.id>1)]#@reverse",
            "items[?(@.id>1)].name.#@take:2@reverse",
            "#@reverse",
        ] {
            let path = PathParser::parse(text).unwrap();
            assert_eq!(path_to_string(&path), text);
            assert_eq!(PathParser::parse(&path_to_string(&path)).unwrap(), path);
        }
    }

    #[test]
    fn keys_with_both_quote_kinds_do_not_round_trip() {
        let path = Ast::path(vec![Ast::key(r#"it's "x""#)]);
        assert!(PathParser::parse(&path_to_string(&path)).is_err());

        let path = Ast::path(vec![Ast::key(r#"say "hi""#)]);
        let text = path_to_string(&path);
        assert_eq!(text, r#"['say "hi"']"#);
        assert_eq!(PathParser::parse(&text).unwrap(), path);
    }

    #[test]
    fn digit_only_keys_stay_keys() {
        let path = Ast::path(vec![Ast::key("123")]);
        let text = path_to_string(&path);
        assert_eq!(text, "[\"123\"]");
        assert_eq!(PathParser::parse(&text).unwrap(), path);
    }

    #[test]
    fn equality_and_accessed_keys() {
        let path1 = PathParser::parse("store.books[?(@.meta.price>25)].title").unwrap();
        let path2 = path1.clone();
        assert!(path_equals(&path1, &path2));
        assert_eq!(
            get_accessed_keys(&path1),
            vec!["store", "books", "meta", "price", "title"]
        );
    }

    #[test]
    fn segment_display() {
        assert_eq!(Ast::key("name").to_string(), "name");
        assert_eq!(Ast::index(3).to_string(), "[3]");
        assert_eq!(Ast::wildcard().to_string(), "#");
        assert_eq!(Ast::modifier("take", Some("2")).to_string(), "@take:2");
        assert_eq!(Literal::Number(29.99).to_string(), "29.99");
        assert_eq!(Literal::Number(25.0).to_string(), "25");
    }
}
