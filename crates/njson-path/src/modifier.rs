//! Result modifiers (`#@name`, `#@name:arg`).
//!
//! Modifiers live in a registry keyed by name, so new ones are added by
//! registering a definition; the evaluator only ever looks them up.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModifierError {
    #[error("unknown modifier: @{0}")]
    Unknown(String),
    #[error("modifier @{name} takes no argument, got '{arg}'")]
    UnexpectedArgument { name: String, arg: String },
    #[error("modifier @{0} requires an argument")]
    MissingArgument(String),
    #[error("modifier @{name}: invalid argument '{arg}'")]
    InvalidArgument { name: String, arg: String },
}

/// Whether a modifier takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierArity {
    None,
    Optional,
    Required,
}

/// Transform applied to the whole result sequence.
pub type ModifierFn =
    for<'a> fn(Vec<&'a Value>, Option<&str>) -> Result<Vec<&'a Value>, ModifierError>;

/// A modifier definition.
#[derive(Debug)]
pub struct ModifierDefinition {
    pub name: &'static str,
    pub arity: ModifierArity,
    pub apply_fn: ModifierFn,
}

/// Map of modifier name -> definition.
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    modifiers: HashMap<String, Arc<ModifierDefinition>>,
}

impl ModifierRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in modifiers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for def in builtin_modifiers() {
            registry.register(def);
        }
        registry
    }

    /// Shared registry of built-in modifiers.
    pub fn standard() -> &'static ModifierRegistry {
        static STANDARD: OnceLock<ModifierRegistry> = OnceLock::new();
        STANDARD.get_or_init(ModifierRegistry::with_builtins)
    }

    /// Add or replace a modifier. Returns the definition it replaced.
    pub fn register(&mut self, def: ModifierDefinition) -> Option<Arc<ModifierDefinition>> {
        self.modifiers.insert(def.name.to_string(), Arc::new(def))
    }

    pub fn get(&self, name: &str) -> Option<&ModifierDefinition> {
        self.modifiers.get(name).map(Arc::as_ref)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up `name` and validate `arg` against its arity.
    pub fn check(&self, name: &str, arg: Option<&str>) -> Result<&ModifierDefinition, ModifierError> {
        let def = self
            .get(name)
            .ok_or_else(|| ModifierError::Unknown(name.to_string()))?;
        match (def.arity, arg) {
            (ModifierArity::None, Some(arg)) => Err(ModifierError::UnexpectedArgument {
                name: name.to_string(),
                arg: arg.to_string(),
            }),
            (ModifierArity::Required, None) => Err(ModifierError::MissingArgument(name.to_string())),
            _ => Ok(def),
        }
    }

    /// Apply modifier `name` to `values`.
    pub fn apply<'a>(
        &self,
        name: &str,
        arg: Option<&str>,
        values: Vec<&'a Value>,
    ) -> Result<Vec<&'a Value>, ModifierError> {
        let def = self.check(name, arg)?;
        (def.apply_fn)(values, arg)
    }
}

impl std::fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("modifiers", &self.names())
            .finish()
    }
}

fn reverse_apply<'a>(mut values: Vec<&'a Value>, _arg: Option<&str>) -> Result<Vec<&'a Value>, ModifierError> {
    values.reverse();
    Ok(values)
}

/// The built-in modifiers.
pub fn builtin_modifiers() -> Vec<ModifierDefinition> {
    vec![ModifierDefinition {
        name: "reverse",
        arity: ModifierArity::None,
        apply_fn: reverse_apply,
    }]
}
