//! Metadata Capture
//!
//! Expressions registered on a cursor are tested whenever the next event is
//! text; matching text is stored under the expression key, last write wins.

use crate::path::CompiledPattern;
use std::collections::HashMap;

/// Captured metadata, key to last captured text
pub type MetadataMap = HashMap<String, String>;

/// A registered (pattern, target depth, key) triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataExpression {
    pattern: CompiledPattern,
    target_depth: usize,
    key: String,
}

impl MetadataExpression {
    pub fn new(pattern: &str, target_depth: usize, key: impl Into<String>) -> Self {
        MetadataExpression {
            pattern: CompiledPattern::compile(pattern),
            target_depth,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn target_depth(&self) -> usize {
        self.target_depth
    }

    /// Anchored test at the given position
    #[inline]
    pub fn matches(&self, path: &str, depth: usize) -> bool {
        self.pattern.matches(path, depth, self.target_depth)
    }
}

/// Registered expressions plus everything they captured
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    expressions: Vec<MetadataExpression>,
    captured: MetadataMap,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expression for the rest of the traversal
    pub fn register(&mut self, expression: MetadataExpression) {
        self.expressions.push(expression);
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    /// Store `text` under every expression matching the position
    pub fn capture(&mut self, path: &str, depth: usize, text: &str) {
        for expression in &self.expressions {
            if expression.matches(path, depth) {
                tracing::trace!(key = expression.key(), path, "captured metadata");
                self.captured.insert(expression.key.clone(), text.to_string());
            }
        }
    }

    /// Append `text` to the values of every expression matching the position
    pub fn extend(&mut self, path: &str, depth: usize, text: &str) {
        for expression in &self.expressions {
            if expression.matches(path, depth) {
                self.captured
                    .entry(expression.key.clone())
                    .or_default()
                    .push_str(text);
            }
        }
    }

    /// Everything captured so far
    pub fn captured(&self) -> &MetadataMap {
        &self.captured
    }
}
