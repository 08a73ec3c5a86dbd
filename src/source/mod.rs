//! Event Sources
//!
//! Pull sources that classify a document into a flat event sequence:
//! - Events: the shared event vocabulary and the `EventSource` contract
//! - Xml: quick-xml backed source
//! - Json: hand-written JSON pull tokenizer

pub mod events;
pub mod json;
pub mod xml;

pub use events::{Attribute, Event, EventSource, NodeStart};
pub use json::{JsonError, JsonEventSource};
pub use xml::XmlEventSource;
