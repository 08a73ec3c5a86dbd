//! Document Cursor
//!
//! Path-aware traversal over an [`EventSource`]. The cursor keeps the stack of
//! open node names and its joined form, drains the attributes of each opened
//! node as separate events, and captures metadata one event ahead of text.
//!
//! One cursor backs exactly one traversal and is dropped when the caller
//! reaches the end of the document or gives up on an error.

pub mod metadata;

use crate::config::CursorConfig;
use crate::decode::Decode;
use crate::error::{Error, Result};
use crate::path::{matches_suffix, PatternCache};
use crate::source::{Attribute, Event, EventSource, JsonEventSource, XmlEventSource};
use metadata::{MetadataExpression, MetadataMap, MetadataRegistry};
use std::collections::{HashMap, VecDeque};

/// Cursor over an XML document
pub type XmlCursor<'a> = DocumentCursor<XmlEventSource<'a>>;

/// Cursor over a JSON document
pub type JsonCursor<'a> = DocumentCursor<JsonEventSource<'a>>;

/// Traversal state over one document
pub struct DocumentCursor<S> {
    source: S,
    config: CursorConfig,
    /// Names of the open nodes, outermost first
    stack: Vec<String>,
    /// `stack` joined as `/a/b`, with `/@name` appended on attribute positions
    path: String,
    current: Option<Event>,
    /// Attributes of the last opened node not yet returned by `advance`
    attributes: VecDeque<Attribute>,
    registry: MetadataRegistry,
    patterns: PatternCache,
    headers: Option<HashMap<String, String>>,
}

impl<'a> DocumentCursor<XmlEventSource<'a>> {
    /// Cursor over an XML string
    pub fn xml(input: &'a str) -> Self {
        DocumentCursor::new(XmlEventSource::new(input))
    }
}

impl<'a> DocumentCursor<JsonEventSource<'a>> {
    /// Cursor over a JSON string
    pub fn json(input: &'a str) -> Self {
        DocumentCursor::new(JsonEventSource::new(input))
    }
}

impl<S: EventSource> DocumentCursor<S> {
    /// Create a cursor with the default configuration
    pub fn new(source: S) -> Self {
        Self::with_config(source, CursorConfig::default())
    }

    /// Create a cursor with an explicit configuration
    pub fn with_config(source: S, config: CursorConfig) -> Self {
        let patterns = PatternCache::new(config.pattern_cache_capacity);
        DocumentCursor {
            source,
            config,
            stack: Vec::with_capacity(16),
            path: String::new(),
            current: None,
            attributes: VecDeque::new(),
            registry: MetadataRegistry::new(),
            patterns,
            headers: None,
        }
    }

    /// Attach the response headers consulted by `header`
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Move to the next event
    ///
    /// Pending attributes of the last opened node come first; after that the
    /// source is pulled. When the event after the new position is text, every
    /// registered metadata expression is tested here and matching text is
    /// captured whether or not the caller ever reads it.
    pub fn advance(&mut self) -> Result<Event> {
        let event = match self.attributes.pop_front() {
            Some(attribute) => Event::Attribute(attribute),
            None => self.source.next_event()?,
        };

        self.update_context(&event)?;

        if !event.is_attribute() {
            self.capture_ahead(event.is_text())?;
        }

        self.current = Some(event.clone());
        Ok(event)
    }

    /// Test metadata expressions against the text about to be read
    ///
    /// `continued` is set when the text is a further chunk of the node whose
    /// first chunk was already captured.
    fn capture_ahead(&mut self, continued: bool) -> Result<()> {
        if self.registry.is_empty() {
            return Ok(());
        }
        if let Some(Event::Text(text)) = self.source.peek()? {
            if continued {
                self.registry.extend(&self.path, self.stack.len(), text);
            } else {
                self.registry.capture(&self.path, self.stack.len(), text);
            }
        }
        Ok(())
    }

    fn update_context(&mut self, event: &Event) -> Result<()> {
        match event {
            Event::StartNode(node) => {
                if let Some(limit) = self.config.max_depth {
                    if self.stack.len() >= limit {
                        tracing::debug!(limit, path = %self.path, "depth limit exceeded");
                        return Err(Error::DepthLimit {
                            path: format!("{}/{}", self.path, node.name),
                            limit,
                        });
                    }
                }
                self.stack.push(node.name.clone());
                self.attributes = node.attributes.iter().cloned().collect();
                self.rebuild_path();
            }
            Event::EndNode => {
                if self.stack.pop().is_none() {
                    return Err(Error::structural(&self.path, "end of node without an open node"));
                }
                self.rebuild_path();
            }
            Event::Attribute(attribute) => {
                self.rebuild_path();
                self.path.push_str("/@");
                self.path.push_str(&attribute.name);
            }
            _ => {
                if matches!(self.current, Some(Event::Attribute(_))) {
                    self.rebuild_path();
                }
            }
        }
        Ok(())
    }

    fn rebuild_path(&mut self) {
        self.path.clear();
        for name in &self.stack {
            self.path.push('/');
            self.path.push_str(name);
        }
    }

    /// Read the text at the current position
    ///
    /// On an attribute this is its value and nothing is consumed. On a start
    /// node, consecutive text events are concatenated up to the node's end,
    /// which is left for the next `advance`.
    pub fn read_text(&mut self) -> Result<String> {
        match &self.current {
            Some(Event::Attribute(attribute)) => return Ok(attribute.value.clone()),
            // Attributes not yet walked are passed over with the node
            Some(Event::StartNode(_)) => self.attributes.clear(),
            Some(other) => {
                let message = format!("cannot read text at {}", other.describe());
                return Err(Error::structural(&self.path, message));
            }
            None => {
                return Err(Error::structural(&self.path, "cannot read text before the first event"));
            }
        }

        let mut text = String::new();
        loop {
            let unexpected = match self.source.peek()? {
                Some(Event::Text(_)) => None,
                Some(Event::EndNode) | None => return Ok(text),
                Some(other) => Some(other.describe()),
            };

            if let Some(found) = unexpected {
                tracing::debug!(path = %self.path, found = %found, "unexpected event while reading text");
                let message = format!("expected text or end of node, found {found}");
                return Err(Error::structural(&self.path, message));
            }

            if let Event::Text(chunk) = self.source.next_event()? {
                text.push_str(&chunk);
                self.capture_ahead(true)?;
            }
        }
    }

    /// Read the current text and decode it as `T`
    pub fn read<T: Decode>(&mut self) -> Result<T> {
        let text = self.read_text()?;
        T::decode(&text).map_err(|source| Error::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Skip the node just opened, including everything inside it
    pub fn skip_node(&mut self) -> Result<()> {
        if !matches!(self.current, Some(Event::StartNode(_))) {
            return Err(Error::structural(&self.path, "skip requires a start of node position"));
        }

        let target = self.stack.len().saturating_sub(1);
        while self.stack.len() > target {
            if self.advance()?.is_end_document() {
                return Err(Error::structural(&self.path, "document ended inside node"));
            }
        }
        Ok(())
    }

    /// Number of open nodes
    #[inline]
    pub fn current_depth(&self) -> usize {
        self.stack.len()
    }

    /// Joined path of the current position
    #[inline]
    pub fn current_path(&self) -> &str {
        &self.path
    }

    /// Name of the innermost open node
    pub fn parent_element(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    /// Event returned by the last `advance`
    pub fn current_event(&self) -> Option<&Event> {
        self.current.as_ref()
    }

    /// Whether the next event is the document start marker
    pub fn is_start_of_document(&mut self) -> Result<bool> {
        Ok(matches!(self.source.peek()?, Some(Event::StartDocument)))
    }

    /// Unanchored test: `.` or a suffix of the current path
    pub fn test_expression(&self, pattern: &str) -> bool {
        matches_suffix(&self.path, pattern)
    }

    /// Anchored test relative to the node at `anchor_depth`
    pub fn test_expression_at(&mut self, pattern: &str, anchor_depth: usize) -> bool {
        self.patterns
            .matches(pattern, &self.path, self.stack.len(), anchor_depth)
    }

    /// Capture text matching `pattern` (anchored at `anchor_depth`) under `key`
    pub fn register_metadata_expression(
        &mut self,
        pattern: &str,
        anchor_depth: usize,
        key: impl Into<String>,
    ) {
        self.registry
            .register(MetadataExpression::new(pattern, anchor_depth, key));
    }

    /// Metadata captured so far
    pub fn metadata(&self) -> &MetadataMap {
        self.registry.captured()
    }

    /// Response header lookup; `None` when no headers were supplied
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name).map(String::as_str)
    }
}
