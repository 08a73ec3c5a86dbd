//! Error Types
//!
//! Three failure families surface from a traversal:
//! - Structural: the event stream does not have the shape a call expects
//! - Decode: a primitive decoder rejected well-formed text
//! - Source: the underlying pull parser failed

use crate::source::json::JsonError;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Traversal error
#[derive(Debug, Error)]
pub enum Error {
    /// The event stream does not match the shape the caller expected
    #[error("structural error at '{path}': {message}")]
    Structural { path: String, message: String },

    /// A primitive decoder failed on the text of the current node
    #[error("cannot decode value at '{path}'")]
    Decode {
        path: String,
        #[source]
        source: FormatError,
    },

    /// Nesting exceeded the configured limit
    #[error("depth limit of {limit} exceeded at '{path}'")]
    DepthLimit { path: String, limit: usize },

    /// The event source raised a low-level parse failure
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl Error {
    pub(crate) fn structural(path: &str, message: impl Into<String>) -> Self {
        Error::Structural {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Joined path at which the error was raised, if known
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::Structural { path, .. }
            | Error::Decode { path, .. }
            | Error::DepthLimit { path, .. } => Some(path),
            Error::Source(_) => None,
        }
    }
}

/// Low-level failure from an event source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] JsonError),
}

/// Primitive decoding failure
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("'{text}' is not a valid integer")]
    Integer {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("'{text}' is not a valid floating point number")]
    Float {
        text: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("'{text}' is not a valid decimal")]
    Decimal {
        text: String,
        #[source]
        source: bigdecimal::ParseBigDecimalError,
    },

    #[error("'{text}' is not a valid big integer")]
    BigInteger {
        text: String,
        #[source]
        source: num_bigint::ParseBigIntError,
    },

    #[error("invalid base64 content")]
    Base64(#[from] base64::DecodeError),

    #[error("'{text}' does not match the {format} date format")]
    Date {
        text: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unrecognized time zone '{zone}' in '{text}'")]
    TimeZone { text: String, zone: String },

    #[error("'{text}' is not a valid epoch timestamp")]
    EpochSeconds {
        text: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("'{text}' has a non-numeric fraction of seconds")]
    InvalidFraction { text: String },

    #[error("'{text}' is out of range")]
    OutOfRange { text: String },
}
