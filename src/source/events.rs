//! Document Event Types
//!
//! Format-agnostic event vocabulary shared by the XML and JSON sources.

use crate::error::SourceError;

/// Document traversal event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start of the document
    StartDocument,
    /// End of the document
    EndDocument,
    /// Node opened; carries its attributes
    StartNode(NodeStart),
    /// Innermost open node closed
    EndNode,
    /// Text content of the innermost open node
    Text(String),
    /// Attribute of the most recently opened node
    Attribute(Attribute),
}

/// Start node event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStart {
    /// Local name (namespace prefix removed)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
}

impl NodeStart {
    /// Create a node start without attributes
    pub fn new(name: impl Into<String>) -> Self {
        NodeStart {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Create a node start with attributes
    pub fn with_attributes(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        NodeStart {
            name: name.into(),
            attributes,
        }
    }

    /// Get an attribute value by name
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// A node attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Local name (namespace prefix removed)
    pub name: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Event {
    /// Check if this is the document start marker
    pub fn is_start_document(&self) -> bool {
        matches!(self, Event::StartDocument)
    }

    /// Check if this is the document end marker
    pub fn is_end_document(&self) -> bool {
        matches!(self, Event::EndDocument)
    }

    /// Check if this is a start node event
    pub fn is_start_node(&self) -> bool {
        matches!(self, Event::StartNode(_))
    }

    /// Check if this is an end node event
    pub fn is_end_node(&self) -> bool {
        matches!(self, Event::EndNode)
    }

    /// Check if this is a text event
    pub fn is_text(&self) -> bool {
        matches!(self, Event::Text(_))
    }

    /// Check if this is an attribute event
    pub fn is_attribute(&self) -> bool {
        matches!(self, Event::Attribute(_))
    }

    /// Get as start node if applicable
    pub fn as_start_node(&self) -> Option<&NodeStart> {
        match self {
            Event::StartNode(n) => Some(n),
            _ => None,
        }
    }

    /// Get text content if applicable
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Short description used in diagnostics
    pub fn describe(&self) -> String {
        match self {
            Event::StartDocument => "start of document".to_string(),
            Event::EndDocument => "end of document".to_string(),
            Event::StartNode(n) => format!("start of node '{}'", n.name),
            Event::EndNode => "end of node".to_string(),
            Event::Text(_) => "text".to_string(),
            Event::Attribute(a) => format!("attribute '{}'", a.name),
        }
    }
}

/// Pull source of classified document events
///
/// Sources emit `StartDocument` first and `EndDocument` last; pulling past the
/// end keeps returning `EndDocument`. Attributes travel inside their
/// `StartNode` and are never emitted as separate events by a source.
pub trait EventSource {
    /// Look at the next event without consuming it
    fn peek(&mut self) -> Result<Option<&Event>, SourceError>;

    /// Consume and return the next event
    fn next_event(&mut self) -> Result<Event, SourceError>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn peek(&mut self) -> Result<Option<&Event>, SourceError> {
        (**self).peek()
    }

    fn next_event(&mut self) -> Result<Event, SourceError> {
        (**self).next_event()
    }
}
