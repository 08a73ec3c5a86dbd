//! Test infrastructure shared by the integration suites
//!
//! Every fixture exists in an XML and a JSON rendering with the same node
//! structure, so one check function can run against both cursors.

#![allow(dead_code)]

use docpath::{DocumentCursor, Event, EventSource, JsonCursor, XmlCursor};

/// One document in both renderings
pub struct Fixture {
    pub xml: &'static str,
    pub json: &'static str,
}

pub const NESTED: Fixture = Fixture {
    xml: "<a><b><c>VALUE</c></b></a>",
    json: r#"{"a": {"b": {"c": "VALUE"}}}"#,
};

pub const METADATA: Fixture = Fixture {
    xml: "<a><b>VALUE</b></a>",
    json: r#"{"a": {"b": "VALUE"}}"#,
};

pub const REPEATED_NAMES: Fixture = Fixture {
    xml: "<Item><Name>top</Name><Child><Name>deep</Name></Child></Item>",
    json: r#"{"Item": {"Name": "top", "Child": {"Name": "deep"}}}"#,
};

pub const NUMBERS: Fixture = Fixture {
    xml: "<r><price>123.123</price><count>42</count><flag>TRUE</flag><at>2013-11-29T23:37:45Z</at></r>",
    json: r#"{"r": {"price": 123.123, "count": 42, "flag": "TRUE", "at": "2013-11-29T23:37:45Z"}}"#,
};

pub const LIST: Fixture = Fixture {
    xml: "<r><items><member>1</member><member>2</member></items><after>x</after></r>",
    json: r#"{"r": {"items": [1, 2], "after": "x"}}"#,
};

impl Fixture {
    pub fn xml_cursor(&self) -> XmlCursor<'static> {
        XmlCursor::xml(self.xml)
    }

    pub fn json_cursor(&self) -> JsonCursor<'static> {
        JsonCursor::json(self.json)
    }
}

/// Run a check against both renderings of a fixture
#[macro_export]
macro_rules! for_both {
    ($fixture:expr, $check:ident) => {{
        $check($fixture.xml_cursor());
        $check($fixture.json_cursor());
    }};
}

/// Advance until a start node with `name` has been returned
pub fn advance_to<S: EventSource>(cursor: &mut DocumentCursor<S>, name: &str) {
    loop {
        match cursor.advance().unwrap() {
            Event::StartNode(node) if node.name == name => return,
            Event::EndDocument => panic!("node {name} not found"),
            _ => {}
        }
    }
}

/// Advance to the end of the document
pub fn drain<S: EventSource>(cursor: &mut DocumentCursor<S>) {
    while !cursor.advance().unwrap().is_end_document() {}
}

/// Compact description of an event with the depth it leaves the cursor at
pub fn describe(event: &Event, depth: usize) -> String {
    match event {
        Event::StartDocument => "StartDocument".to_string(),
        Event::EndDocument => "EndDocument".to_string(),
        Event::StartNode(node) => format!("Start {} @{depth}", node.name),
        Event::EndNode => format!("End @{depth}"),
        Event::Text(text) => format!("Text {text:?} @{depth}"),
        Event::Attribute(attr) => format!("Attr {}={:?} @{depth}", attr.name, attr.value),
    }
}

/// Full traversal as described events
pub fn trace<S: EventSource>(mut cursor: DocumentCursor<S>) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        let event = cursor.advance().unwrap();
        out.push(describe(&event, cursor.current_depth()));
        if event.is_end_document() {
            return out;
        }
    }
}
