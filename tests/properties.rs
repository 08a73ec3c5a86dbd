//! Property tests over generated documents
//!
//! A random node tree is rendered as XML and as JSON; both traversals must
//! keep the depth equal to opened minus closed nodes and produce the same
//! event sequence.

mod common;

use docpath::{DocumentCursor, Event, EventSource, JsonCursor, XmlCursor};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Leaf(String, String),
    Branch(String, Vec<Node>),
}

impl Node {
    fn height(&self) -> usize {
        match self {
            Node::Leaf(..) => 1,
            Node::Branch(_, children) => 1 + children.iter().map(Node::height).max().unwrap_or(0),
        }
    }

    fn to_xml(&self, out: &mut String) {
        match self {
            Node::Leaf(name, text) => {
                out.push_str(&format!("<{name}>{text}</{name}>"));
            }
            Node::Branch(name, children) => {
                out.push_str(&format!("<{name}>"));
                for child in children {
                    child.to_xml(out);
                }
                out.push_str(&format!("</{name}>"));
            }
        }
    }

    /// Member as `"name": value`
    fn to_json(&self, out: &mut String) {
        match self {
            Node::Leaf(name, text) => {
                out.push_str(&format!("\"{name}\": \"{text}\""));
            }
            Node::Branch(name, children) => {
                out.push_str(&format!("\"{name}\": {{"));
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    child.to_json(out);
                }
                out.push('}');
            }
        }
    }

    fn render(&self) -> (String, String) {
        let mut xml = String::new();
        self.to_xml(&mut xml);
        let mut json = String::from("{");
        self.to_json(&mut json);
        json.push('}');
        (xml, json)
    }
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let name = "[a-z][a-z0-9]{0,5}";
    let leaf = (name, "[A-Za-z0-9]{1,8}").prop_map(|(n, t)| Node::Leaf(n, t));
    leaf.prop_recursive(6, 48, 4, move |inner| {
        (name, prop::collection::vec(inner, 0..4)).prop_map(|(n, c)| Node::Branch(n, c))
    })
}

/// Walk to the end, checking the depth after every event; returns the maximum
fn walk<S: EventSource>(mut cursor: DocumentCursor<S>) -> Result<usize, TestCaseError> {
    let (mut opened, mut closed, mut deepest) = (0usize, 0usize, 0usize);
    loop {
        let event = cursor.advance().map_err(|e| TestCaseError::fail(e.to_string()))?;
        match event {
            Event::StartNode(_) => opened += 1,
            Event::EndNode => closed += 1,
            _ => {}
        }
        prop_assert!(closed <= opened);
        prop_assert_eq!(cursor.current_depth(), opened - closed);
        prop_assert_eq!(cursor.current_path().matches('/').count(), opened - closed);
        deepest = deepest.max(cursor.current_depth());
        if event.is_end_document() {
            prop_assert_eq!(cursor.current_depth(), 0);
            return Ok(deepest);
        }
    }
}

proptest! {
    #[test]
    fn prop_depth_never_negative(root in node_strategy()) {
        let (xml, json) = root.render();
        prop_assert_eq!(walk(XmlCursor::xml(&xml))?, root.height());
        prop_assert_eq!(walk(JsonCursor::json(&json))?, root.height());
    }

    #[test]
    fn prop_backends_agree(root in node_strategy()) {
        let (xml, json) = root.render();
        prop_assert_eq!(common::trace(XmlCursor::xml(&xml)), common::trace(JsonCursor::json(&json)));
    }

    #[test]
    fn prop_current_node_matches_everywhere(root in node_strategy()) {
        let (xml, _) = root.render();
        let mut cursor = XmlCursor::xml(&xml);
        loop {
            prop_assert!(cursor.test_expression("."));
            let depth = cursor.current_depth();
            prop_assert!(cursor.test_expression_at(".", depth));
            if cursor.advance().map_err(|e| TestCaseError::fail(e.to_string()))?.is_end_document() {
                break;
            }
        }
    }
}
