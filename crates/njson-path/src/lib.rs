//! Compact JSON path expressions.
//!
//! Paths are dot-separated keys and indices with a few extras:
//! `#` iterates an array, `[?(@.field OP literal)]` filters it and
//! `#@name[:arg]` applies a modifier to the whole result sequence.
//!
//! # Example
//!
//! ```
//! use njson_path::{query, set_path};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "store": {
//!         "books": [
//!             {"title": "Sayings of the Century", "price": 8.95},
//!             {"title": "Sword of Honour", "price": 32.5}
//!         ]
//!     }
//! });
//!
//! let result = query(&doc, "store.books[?(@.price>25)].title").unwrap();
//! assert_eq!(result.values, vec![&json!("Sword of Honour")]);
//!
//! let edited = set_path(&doc, "store.books[0].price", json!(9)).unwrap();
//! assert_eq!(edited["store"]["books"][0]["price"], json!(9));
//! ```

mod types;
pub use types::*;

mod ast;
pub use ast::Ast;

mod parser;
pub use parser::{PathParser, SyntaxError};

mod predicate;
pub use predicate::evaluate as evaluate_predicate;

mod modifier;
pub use modifier::{
    builtin_modifiers, ModifierArity, ModifierDefinition, ModifierError, ModifierFn, ModifierRegistry,
};

mod eval;
pub use eval::{EvalOptions, PathEval, QueryResult};

mod mutate;
pub use mutate::{MutationError, MAX_ARRAY_PADDING};

mod cache;
pub use cache::PathCache;

mod value;
pub use value::{get_index, get_key, ValueType};

mod util;
pub use util::{get_accessed_keys, path_equals, path_to_string};

mod error;
pub use error::Error;

use serde_json::Value;

/// Parse `path` and evaluate it against `root` with the built-in modifiers.
pub fn query<'a>(root: &'a Value, path: &str) -> Result<QueryResult<'a>, Error> {
    let parsed = PathParser::parse(path)?;
    Ok(PathEval::default().get(root, &parsed)?)
}

/// Return a copy of `root` with `value` stored at `path`.
pub fn set_path(root: &Value, path: &str, value: Value) -> Result<Value, Error> {
    let parsed = PathParser::parse(path)?;
    Ok(mutate::set(root, &parsed, value)?)
}

/// Return a copy of `root` without the value at `path`.
pub fn delete_path(root: &Value, path: &str) -> Result<Value, Error> {
    let parsed = PathParser::parse(path)?;
    Ok(mutate::delete(root, &parsed)?)
}

/// Set and delete on parsed paths.
pub mod edit {
    pub use crate::mutate::{delete, set};
}
