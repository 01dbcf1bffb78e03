//! `json-cli`: path get/set/delete over JSON text.
//!
//! Provides the core logic used by the `njson` binary:
//! - `get`    - evaluate a path and report the result with its type tag
//! - `set`    - store a value at a single-target path
//! - `delete` - remove the value at a single-target path
//!
//! Every operation takes and produces JSON text. The path is parsed before
//! the document, so a malformed path is reported even when the document is
//! also broken.

use std::sync::{Arc, OnceLock};

use njson_path::edit;
use njson_path::{
    EvalOptions, ModifierError, ModifierRegistry, MutationError, Path, PathCache, PathEval,
    RegexMatch, SyntaxError, ValueType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON document: {0}")]
    Document(#[source] serde_json::Error),
    #[error("invalid JSON value: {0}")]
    Value(#[source] serde_json::Error),
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("modifier error: {0}")]
    Modifier(#[from] ModifierError),
    #[error("{0}")]
    Mutation(#[from] MutationError),
    #[error("cannot serialize result: {0}")]
    Serialize(#[source] serde_json::Error),
}

// ── Configuration ─────────────────────────────────────────────────────────

/// Default number of parsed paths kept by an [`Engine`].
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Engine settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How `=~` applies its pattern.
    pub regex_match: RegexMatch,
    /// Maximum number of cached paths; `None` keeps every path.
    pub cache_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regex_match: RegexMatch::default(),
            cache_capacity: Some(DEFAULT_CACHE_CAPACITY),
        }
    }
}

// ── Responses ─────────────────────────────────────────────────────────────

/// Outcome of [`get`].
///
/// `value` holds the raw result; `string`, `number` and `bool` repeat it for
/// the matching scalar type so callers can tell `30` from `"30"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    pub exists: bool,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl GetResponse {
    fn found(value: Value) -> Self {
        Self {
            exists: true,
            value_type: ValueType::of(&value),
            string: value.as_str().map(str::to_owned),
            number: value.as_f64(),
            bool: value.as_bool(),
            value: Some(value),
            error: String::new(),
        }
    }

    fn not_found() -> Self {
        Self {
            exists: false,
            value_type: ValueType::Null,
            value: None,
            string: None,
            number: None,
            bool: None,
            error: String::new(),
        }
    }

    fn failed(err: &CliError) -> Self {
        Self {
            error: err.to_string(),
            ..Self::not_found()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Outcome of [`set`] and [`delete`]: the new document, or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl EditResponse {
    fn from_result(result: Result<Value, CliError>) -> Self {
        match result {
            Ok(doc) => Self {
                json: Some(doc),
                error: String::new(),
            },
            Err(err) => Self {
                json: None,
                error: err.to_string(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

// ── Engine ────────────────────────────────────────────────────────────────

/// Path cache, modifier registry and evaluation options bundled together.
#[derive(Debug)]
pub struct Engine {
    cache: PathCache,
    modifiers: ModifierRegistry,
    options: EvalOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = match config.cache_capacity {
            Some(capacity) => PathCache::with_capacity(capacity),
            None => PathCache::new(),
        };
        Self {
            cache,
            modifiers: ModifierRegistry::with_builtins(),
            options: EvalOptions {
                regex_match: config.regex_match,
            },
        }
    }

    /// Replace the modifier registry.
    pub fn with_modifiers(mut self, modifiers: ModifierRegistry) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Process-wide engine with the default configuration.
    pub fn shared() -> &'static Engine {
        static SHARED: OnceLock<Engine> = OnceLock::new();
        SHARED.get_or_init(Engine::default)
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    pub fn parse(&self, path: &str) -> Result<Arc<Path>, CliError> {
        Ok(self.cache.get_or_parse(path)?)
    }

    /// Evaluate `path` against `document`. `None` means the path does not
    /// exist; a fanned-out path yields an array, possibly empty.
    pub fn try_get(&self, document: &str, path: &str) -> Result<Option<Value>, CliError> {
        let parsed = self.parse(path)?;
        let doc = parse_document(document)?;
        let result = PathEval::new(&self.modifiers, self.options).get(&doc, &parsed)?;
        tracing::trace!(path, exists = result.exists, matches = result.values.len(), "evaluated path");
        Ok(result.value().map(|v| v.into_owned()))
    }

    /// Store the JSON text `value` at `path`; returns the new document as
    /// compact JSON.
    pub fn try_set(&self, document: &str, path: &str, value: &str) -> Result<String, CliError> {
        to_text(&self.set_value(document, path, value)?)
    }

    /// Remove the value at `path`; returns the new document as compact JSON.
    pub fn try_delete(&self, document: &str, path: &str) -> Result<String, CliError> {
        to_text(&self.delete_value(document, path)?)
    }

    pub fn get(&self, document: &str, path: &str) -> GetResponse {
        match self.try_get(document, path) {
            Ok(Some(value)) => GetResponse::found(value),
            Ok(None) => GetResponse::not_found(),
            Err(err) => {
                tracing::debug!(path, error = %err, "get failed");
                GetResponse::failed(&err)
            }
        }
    }

    pub fn set(&self, document: &str, path: &str, value: &str) -> EditResponse {
        let result = self.set_value(document, path, value);
        if let Err(err) = &result {
            tracing::debug!(path, error = %err, "set failed");
        }
        EditResponse::from_result(result)
    }

    pub fn delete(&self, document: &str, path: &str) -> EditResponse {
        let result = self.delete_value(document, path);
        if let Err(err) = &result {
            tracing::debug!(path, error = %err, "delete failed");
        }
        EditResponse::from_result(result)
    }

    fn set_value(&self, document: &str, path: &str, value: &str) -> Result<Value, CliError> {
        let parsed = self.parse(path)?;
        let doc = parse_document(document)?;
        let value: Value = serde_json::from_str(value).map_err(CliError::Value)?;
        Ok(edit::set(&doc, &parsed, value)?)
    }

    fn delete_value(&self, document: &str, path: &str) -> Result<Value, CliError> {
        let parsed = self.parse(path)?;
        let doc = parse_document(document)?;
        Ok(edit::delete(&doc, &parsed)?)
    }
}

fn parse_document(document: &str) -> Result<Value, CliError> {
    serde_json::from_str(document).map_err(CliError::Document)
}

fn to_text(value: &Value) -> Result<String, CliError> {
    serde_json::to_string(value).map_err(CliError::Serialize)
}

// ── Free functions ────────────────────────────────────────────────────────

/// [`Engine::get`] on the shared engine.
pub fn get(document: &str, path: &str) -> GetResponse {
    Engine::shared().get(document, path)
}

/// [`Engine::set`] on the shared engine.
pub fn set(document: &str, path: &str, value: &str) -> EditResponse {
    Engine::shared().set(document, path, value)
}

/// [`Engine::delete`] on the shared engine.
pub fn delete(document: &str, path: &str) -> EditResponse {
    Engine::shared().delete(document, path)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_scalar_with_type_tag() {
        let resp = get(r#"{"a":{"b":[1,2,3]}}"#, "a.b.1");
        assert!(resp.exists);
        assert_eq!(resp.value_type, ValueType::Number);
        assert_eq!(resp.value, Some(json!(2)));
        assert_eq!(resp.number, Some(2.0));
        assert_eq!(resp.string, None);
        assert!(resp.is_ok());
    }

    #[test]
    fn get_distinguishes_number_from_string() {
        let doc = r#"{"n":30,"s":"30"}"#;
        assert_eq!(get(doc, "n").value_type, ValueType::Number);
        let s = get(doc, "s");
        assert_eq!(s.value_type, ValueType::String);
        assert_eq!(s.string.as_deref(), Some("30"));
        assert_eq!(s.number, None);
    }

    #[test]
    fn get_missing_path() {
        let resp = get(r#"{"a":1}"#, "a.b");
        assert!(!resp.exists);
        assert_eq!(resp.value_type, ValueType::Null);
        assert!(resp.is_ok());
        let text = serde_json::to_string(&resp).unwrap();
        assert_eq!(text, r#"{"exists":false,"type":"null"}"#);
    }

    #[test]
    fn get_errors_land_in_response() {
        let resp = get("{not json", "a");
        assert!(!resp.is_ok());
        assert!(resp.error.starts_with("invalid JSON document"));

        // The path is checked before the document.
        let resp = get("{not json", "a[");
        assert!(resp.error.starts_with("syntax error"));

        let resp = get(r#"{"a":[1]}"#, "a.#@shuffle");
        assert_eq!(resp.error, "modifier error: unknown modifier: @shuffle");
    }

    #[test]
    fn set_and_delete_scenarios() {
        let resp = set(r#"{"items":[{"id":1},{"id":2}]}"#, "items[0].id", "99");
        assert_eq!(resp.json, Some(json!({"items": [{"id": 99}, {"id": 2}]})));

        let resp = set("{}", "a.b.0", "5");
        assert_eq!(resp.json, Some(json!({"a": {"b": [5]}})));

        let resp = delete(r#"{"a":{"b":1}}"#, "a.b");
        assert_eq!(resp.json, Some(json!({"a": {}})));
    }

    #[test]
    fn edit_errors_land_in_response() {
        let resp = set(r#"{"a":[1]}"#, "a.#", "0");
        assert!(resp.json.is_none());
        assert!(resp.error.starts_with("unsupported path"));

        let resp = set(r#"{"a":1}"#, "a", "{oops");
        assert!(resp.error.starts_with("invalid JSON value"));

        let text = serde_json::to_string(&delete("[1", "a")).unwrap();
        assert!(text.starts_with(r#"{"error":"invalid JSON document"#));
    }

    #[test]
    fn try_variants_return_compact_text() {
        let engine = Engine::default();
        let out = engine.try_set(r#"{ "x": 1, "y": 2 }"#, "y", "[true]").unwrap();
        assert_eq!(out, r#"{"x":1,"y":[true]}"#);
        let out = engine.try_delete(&out, "x").unwrap();
        assert_eq!(out, r#"{"y":[true]}"#);
        assert!(matches!(
            engine.try_delete(&out, ""),
            Err(CliError::Syntax(SyntaxError::EmptyPath))
        ));
        assert_eq!(engine.try_get(&out, "y.#").unwrap(), Some(json!([true])));
        assert_eq!(engine.try_get(&out, "z").unwrap(), None);
    }

    #[test]
    fn engine_config_controls_regex_and_cache() {
        let config: EngineConfig = serde_json::from_str(r#"{"regex_match":"full"}"#).unwrap();
        assert_eq!(config.cache_capacity, Some(DEFAULT_CACHE_CAPACITY));

        let engine = Engine::new(config);
        let doc = r#"{"xs":["abc","b"]}"#;
        assert_eq!(engine.try_get(doc, r#"xs[?(@=~"b")]"#).unwrap(), Some(json!(["b"])));
        assert_eq!(
            Engine::default().try_get(doc, r#"xs[?(@=~"b")]"#).unwrap(),
            Some(json!(["abc", "b"]))
        );

        engine.try_get(doc, "xs.0").unwrap();
        engine.try_get(doc, "xs.0").unwrap();
        assert_eq!(engine.cache().len(), 2);
    }

    #[test]
    fn custom_modifiers_through_engine() {
        fn first<'a>(values: Vec<&'a Value>, _arg: Option<&str>) -> Result<Vec<&'a Value>, ModifierError> {
            Ok(values.into_iter().take(1).collect())
        }
        let mut registry = ModifierRegistry::with_builtins();
        registry.register(njson_path::ModifierDefinition {
            name: "first",
            arity: njson_path::ModifierArity::None,
            apply_fn: first,
        });
        let engine = Engine::default().with_modifiers(registry);
        assert_eq!(
            engine.try_get("[3,2,1]", "#@reverse@first").unwrap(),
            Some(json!([1]))
        );
        assert!(engine.modifiers().get("first").is_some());
    }
}
