//! Path Matching
//!
//! Pseudo-xpath tests against the forward-slash-joined path of the open nodes
//! (`/a/b/c`, or `/a/b/@id` while positioned on an attribute).
//!
//! - Unanchored: `.` always matches, otherwise the joined path must end with
//!   the pattern text (`b/c` matches `/a/b/c` but not `/a/bc`).
//! - Anchored: the pattern is read relative to the node at `anchor_depth`.
//!   Each step of the pattern adds one level, except attribute steps (`@name`)
//!   which stay on their owning node. The match needs both the exact depth and
//!   the joined path ending with `/` + pattern, so a repeated name at another
//!   nesting level is never picked up by accident.

use lru::LruCache;
use memchr::memchr_iter;
use std::num::NonZeroUsize;

/// Pattern that matches any position
pub const CURRENT_NODE: &str = ".";

/// Attribute step marker
const ATTRIBUTE_MARKER: u8 = b'@';

/// Unanchored suffix test
#[inline]
pub fn matches_suffix(path: &str, pattern: &str) -> bool {
    pattern == CURRENT_NODE || path.ends_with(pattern)
}

/// Pattern prepared for anchored matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    /// `/` + pattern, tested as a suffix of the joined path
    anchored: String,
    /// Levels below the anchor that the pattern spans
    steps: usize,
}

impl CompiledPattern {
    /// Compile a pattern for anchored matching
    pub fn compile(pattern: &str) -> Self {
        let bytes = pattern.as_bytes();
        let separators = memchr_iter(b'/', bytes)
            .filter(|&i| bytes.get(i + 1) != Some(&ATTRIBUTE_MARKER))
            .count();
        let steps = if bytes.first() == Some(&ATTRIBUTE_MARKER) {
            separators
        } else {
            separators + 1
        };

        let mut anchored = String::with_capacity(pattern.len() + 1);
        anchored.push('/');
        anchored.push_str(pattern);

        CompiledPattern { anchored, steps }
    }

    /// Pattern text as given to `compile`
    pub fn pattern(&self) -> &str {
        &self.anchored[1..]
    }

    /// Depth a match requires relative to the anchor
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Anchored test against a joined path at `depth`
    #[inline]
    pub fn matches(&self, path: &str, depth: usize, anchor_depth: usize) -> bool {
        if self.pattern() == CURRENT_NODE {
            return true;
        }
        anchor_depth + self.steps == depth && path.ends_with(&self.anchored)
    }
}

/// LRU cache of compiled patterns keyed by pattern text
pub struct PatternCache {
    cache: LruCache<String, CompiledPattern>,
}

impl PatternCache {
    /// Create a cache holding at most `capacity` patterns
    pub fn new(capacity: NonZeroUsize) -> Self {
        PatternCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Anchored test of `pattern`, compiling and caching it on a miss
    pub fn matches(&mut self, pattern: &str, path: &str, depth: usize, anchor_depth: usize) -> bool {
        if let Some(compiled) = self.cache.get(pattern) {
            return compiled.matches(path, depth, anchor_depth);
        }
        let compiled = CompiledPattern::compile(pattern);
        let matched = compiled.matches(path, depth, anchor_depth);
        self.cache.put(pattern.to_string(), compiled);
        matched
    }

    /// Number of cached patterns
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
