//! XML Event Source
//!
//! Pull source over quick-xml. Element and attribute names are reduced to
//! their local part and empty elements are expanded into a start/end pair.
//! Whitespace-only text next to a child element is indentation and is dropped;
//! inside a leaf (`<a> </a>`) it is kept. Reaching the end of input with
//! elements still open is an error.

use super::events::{Attribute, Event, EventSource, NodeStart};
use crate::error::SourceError;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use std::collections::VecDeque;

/// XML pull source over a borrowed document
pub struct XmlEventSource<'a> {
    reader: Reader<&'a [u8]>,
    pending: VecDeque<Event>,
    /// Names of the elements not yet closed
    open: Vec<String>,
    /// Whitespace-only text waiting to see whether its element is a leaf
    held: Option<String>,
    /// Last buffered event was a start node or text
    in_content: bool,
    started: bool,
    finished: bool,
}

impl<'a> XmlEventSource<'a> {
    /// Create a source over a string document
    pub fn new(input: &'a str) -> Self {
        Self::from_bytes(input.as_bytes())
    }

    /// Create a source over UTF-8 bytes
    pub fn from_bytes(input: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().check_end_names = true;
        XmlEventSource {
            reader,
            pending: VecDeque::with_capacity(4),
            open: Vec::new(),
            held: None,
            in_content: false,
            started: false,
            finished: false,
        }
    }

    /// Byte offset of the reader in the input
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    /// Pull from quick-xml until at least one event is buffered
    fn fill(&mut self) -> Result<(), SourceError> {
        while self.pending.is_empty() {
            if !self.started {
                self.started = true;
                self.pending.push_back(Event::StartDocument);
                break;
            }
            if self.finished {
                self.pending.push_back(Event::EndDocument);
                break;
            }

            match self.reader.read_event()? {
                XmlEvent::Start(e) => {
                    let node = node_start(&e)?;
                    self.held = None;
                    self.open.push(node.name.clone());
                    self.pending.push_back(Event::StartNode(node));
                    self.in_content = true;
                }
                XmlEvent::Empty(e) => {
                    let node = node_start(&e)?;
                    self.held = None;
                    self.pending.push_back(Event::StartNode(node));
                    self.pending.push_back(Event::EndNode);
                    self.in_content = false;
                }
                XmlEvent::End(_) => {
                    self.release_held();
                    self.open.pop();
                    self.pending.push_back(Event::EndNode);
                    self.in_content = false;
                }
                XmlEvent::Text(e) => {
                    let text = e.unescape()?;
                    if !is_blank(&text) {
                        self.push_text(text.into_owned());
                    } else if self.in_content {
                        self.held.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                XmlEvent::CData(e) => {
                    let raw = e.into_inner();
                    self.push_text(String::from_utf8_lossy(&raw).into_owned());
                }
                XmlEvent::Eof => {
                    if let Some(name) = self.open.pop() {
                        return Err(quick_xml::Error::from(IllFormedError::MissingEndTag(name)).into());
                    }
                    self.finished = true;
                    self.pending.push_back(Event::EndDocument);
                }
                // Declarations, comments, processing instructions and DOCTYPE
                _ => {}
            }
        }
        Ok(())
    }

    fn push_text(&mut self, text: String) {
        self.release_held();
        self.pending.push_back(Event::Text(text));
        self.in_content = true;
    }

    /// Held whitespace turned out to be content
    fn release_held(&mut self) {
        if let Some(blank) = self.held.take() {
            self.pending.push_back(Event::Text(blank));
        }
    }
}

impl EventSource for XmlEventSource<'_> {
    fn peek(&mut self) -> Result<Option<&Event>, SourceError> {
        self.fill()?;
        Ok(self.pending.front())
    }

    fn next_event(&mut self) -> Result<Event, SourceError> {
        self.fill()?;
        Ok(self.pending.pop_front().unwrap_or(Event::EndDocument))
    }
}

/// Build a node start from a quick-xml tag, skipping namespace declarations
fn node_start(tag: &BytesStart<'_>) -> Result<NodeStart, SourceError> {
    let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push(Attribute { name, value });
    }

    Ok(NodeStart::with_attributes(name, attributes))
}

#[inline]
fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<Event> {
        let mut source = XmlEventSource::new(input);
        let mut events = Vec::new();
        loop {
            let event = source.next_event().unwrap();
            let done = event.is_end_document();
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[test]
    fn test_simple_element() {
        let events = collect("<root>hello</root>");
        assert_eq!(
            events,
            vec![
                Event::StartDocument,
                Event::StartNode(NodeStart::new("root")),
                Event::Text("hello".to_string()),
                Event::EndNode,
                Event::EndDocument,
            ]
        );
    }

    #[test]
    fn test_empty_element_expanded() {
        let events = collect("<a><br/></a>");
        assert_eq!(events.len(), 6);
        assert!(matches!(&events[2], Event::StartNode(n) if n.name == "br"));
        assert!(events[3].is_end_node());
    }

    #[test]
    fn test_attributes_and_namespaces() {
        let events = collect(r#"<ns:item xmlns:ns="urn:x" ns:id="7" kind="a&amp;b"/>"#);
        let node = events[1].as_start_node().unwrap();
        assert_eq!(node.name, "item");
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.get_attribute_value("id"), Some("7"));
        assert_eq!(node.get_attribute_value("kind"), Some("a&b"));
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let events = collect("<?xml version=\"1.0\"?>\n<a>\n  <b>x</b>\n</a>");
        assert!(events.iter().filter(|e| e.is_text()).all(|e| e.as_text() == Some("x")));
    }

    #[test]
    fn test_whitespace_kept_inside_leaf() {
        let events = collect("<r> <a> </a>\n<b>x<!-- c --> </b></r>");
        let texts: Vec<_> = events.iter().filter_map(|e| e.as_text()).collect();
        assert_eq!(texts, vec![" ", "x", " "]);
    }

    #[test]
    fn test_truncated_document_is_source_error() {
        let mut source = XmlEventSource::new("<a><b>x</b>");
        let result = (0..6).try_for_each(|_| source.next_event().map(|_| ()));
        match result {
            Err(SourceError::Xml(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)))) => {
                assert_eq!(name, "a")
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_cdata_and_entities() {
        let events = collect("<a>1 &lt; 2<![CDATA[<raw>]]></a>");
        let texts: Vec<_> = events.iter().filter_map(|e| e.as_text()).collect();
        assert_eq!(texts, vec!["1 < 2", "<raw>"]);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut source = XmlEventSource::new("<a/>");
        assert!(source.peek().unwrap().unwrap().is_start_document());
        assert!(source.next_event().unwrap().is_start_document());
        assert!(source.peek().unwrap().unwrap().is_start_node());
    }

    #[test]
    fn test_end_document_repeats() {
        let mut source = XmlEventSource::new("<a/>");
        for _ in 0..4 {
            source.next_event().unwrap();
        }
        assert!(source.next_event().unwrap().is_end_document());
        assert!(source.next_event().unwrap().is_end_document());
    }

    #[test]
    fn test_mismatched_end_is_source_error() {
        let mut source = XmlEventSource::new("<a></b>");
        let result = (0..4).try_for_each(|_| source.next_event().map(|_| ()));
        assert!(matches!(result, Err(SourceError::Xml(_))));
    }
}
