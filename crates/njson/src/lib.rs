//! njson: path queries and edits over JSON text.
//!
//! The engine itself lives in [`njson_path`]; this crate wraps it in
//! text-in/text-out operations and the `njson` command line tool.

pub mod json_cli;

pub use njson_path as path;
