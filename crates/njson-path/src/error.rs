//! Crate-level error type.

use thiserror::Error;

use crate::modifier::ModifierError;
use crate::mutate::MutationError;
use crate::parser::SyntaxError;

/// Any failure from the convenience entry points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("modifier error: {0}")]
    Modifier(#[from] ModifierError),
    #[error("mutation error: {0}")]
    Mutation(#[from] MutationError),
}
