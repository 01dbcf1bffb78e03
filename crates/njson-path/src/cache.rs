//! Parsed-path cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::parser::{PathParser, SyntaxError};
use crate::types::Path;

/// Concurrent cache of parsed paths keyed by their source text.
///
/// Parsing is a pure function of the text, so entries never go stale. Parse
/// errors are not cached. Once `capacity` entries are stored, further paths
/// are parsed and returned without being kept.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: DashMap<String, Arc<Path>>,
    capacity: Option<usize>,
}

impl PathCache {
    /// An unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` paths.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Return the cached AST for `text`, parsing it on a miss.
    pub fn get_or_parse(&self, text: &str) -> Result<Arc<Path>, SyntaxError> {
        if let Some(entry) = self.entries.get(text) {
            tracing::trace!(path = text, "path cache hit");
            return Ok(Arc::clone(entry.value()));
        }

        let parsed = Arc::new(PathParser::parse(text)?);
        if self.capacity.is_some_and(|cap| self.entries.len() >= cap) {
            tracing::debug!(path = text, "path cache full, not storing");
            return Ok(parsed);
        }

        tracing::debug!(path = text, "path cache miss");
        // Another thread may have inserted the same text meanwhile; keep theirs.
        let entry = self.entries.entry(text.to_string()).or_insert(parsed);
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
