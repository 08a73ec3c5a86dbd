//! docpath - Streaming, path-aware unmarshalling over XML and JSON
//!
//! Layers:
//! A: Event sources (XML via quick-xml, JSON via a pull tokenizer)
//! B: Path matching (unanchored suffix and depth-anchored tests)
//! C: Document cursor (path stack, attributes, metadata capture)
//! D: Primitive decoders (numbers, booleans, base64, dates)
//!
//! ```
//! use docpath::XmlCursor;
//!
//! let mut cursor = XmlCursor::xml("<Response><RequestId>abc</RequestId></Response>");
//! cursor.register_metadata_expression("RequestId", 1, "request-id");
//! while !cursor.advance()?.is_end_document() {}
//! assert_eq!(cursor.metadata()["request-id"], "abc");
//! # Ok::<(), docpath::Error>(())
//! ```

pub mod config;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod path;
pub mod source;

pub use config::CursorConfig;
pub use cursor::metadata::{MetadataExpression, MetadataMap, MetadataRegistry};
pub use cursor::{DocumentCursor, JsonCursor, XmlCursor};
pub use decode::date::{
    format_compressed_iso8601, format_iso8601, format_rfc822, parse_compressed_iso8601,
    parse_epoch_seconds, parse_iso8601, parse_rfc822, DateFormat,
};
pub use decode::{Decode, Primitive, PrimitiveKind};
pub use error::{Error, FormatError, Result, SourceError};
pub use path::{matches_suffix, CompiledPattern, PatternCache};
pub use source::{Attribute, Event, EventSource, JsonEventSource, NodeStart, XmlEventSource};
