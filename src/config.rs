//! Cursor Configuration

use std::num::NonZeroUsize;

/// Default number of compiled patterns kept per cursor
pub const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 64;

/// Node name used for JSON array elements
pub const ARRAY_MEMBER_NAME: &str = "member";

/// Per-traversal cursor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorConfig {
    /// Maximum nesting depth before `advance` fails (unbounded when `None`)
    pub max_depth: Option<usize>,
    /// Capacity of the compiled pattern cache
    pub pattern_cache_capacity: NonZeroUsize,
}

impl CursorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        CursorConfig {
            max_depth: None,
            pattern_cache_capacity: NonZeroUsize::new(DEFAULT_PATTERN_CACHE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Limit nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the compiled pattern cache capacity
    pub fn with_pattern_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.pattern_cache_capacity = capacity;
        self
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self::new()
    }
}
