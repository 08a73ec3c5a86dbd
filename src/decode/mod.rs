//! Primitive Decoders
//!
//! Stateless text-to-value converters applied to the output of
//! `DocumentCursor::read_text`. Two ways in:
//! - [`Decode`]: static dispatch on the target type (`cursor.read::<i64>()`)
//! - [`PrimitiveKind`]: tagged dispatch when the type is only known at runtime
//!
//! All decoders are pure and safe to share across concurrent traversals.

pub mod date;

use crate::error::FormatError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::str::FromStr;

/// Conversion from node text into a typed value
pub trait Decode: Sized {
    fn decode(text: &str) -> Result<Self, FormatError>;
}

macro_rules! integer_decoder {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            /// Base-10 integer parse
            pub fn $name(text: &str) -> Result<$ty, FormatError> {
                text.parse::<$ty>().map_err(|source| FormatError::Integer {
                    text: text.to_string(),
                    source,
                })
            }

            impl Decode for $ty {
                #[inline]
                fn decode(text: &str) -> Result<Self, FormatError> {
                    $name(text)
                }
            }
        )*
    };
}

macro_rules! float_decoder {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            /// Locale-independent decimal parse
            pub fn $name(text: &str) -> Result<$ty, FormatError> {
                text.parse::<$ty>().map_err(|source| FormatError::Float {
                    text: text.to_string(),
                    source,
                })
            }

            impl Decode for $ty {
                #[inline]
                fn decode(text: &str) -> Result<Self, FormatError> {
                    $name(text)
                }
            }
        )*
    };
}

integer_decoder! {
    decode_byte => i8,
    decode_short => i16,
    decode_integer => i32,
    decode_long => i64,
}

float_decoder! {
    decode_float => f32,
    decode_double => f64,
}

/// Arbitrary precision decimal; keeps every digit and the scale
pub fn decode_big_decimal(text: &str) -> Result<BigDecimal, FormatError> {
    BigDecimal::from_str(text).map_err(|source| FormatError::Decimal {
        text: text.to_string(),
        source,
    })
}

/// Arbitrary precision integer
pub fn decode_big_integer(text: &str) -> Result<BigInt, FormatError> {
    BigInt::from_str(text).map_err(|source| FormatError::BigInteger {
        text: text.to_string(),
        source,
    })
}

/// Only the literal `true` is true; anything else is false
#[inline]
pub fn decode_boolean(text: &str) -> bool {
    text == "true"
}

/// Standard base64 with padding
pub fn decode_byte_buffer(text: &str) -> Result<Vec<u8>, FormatError> {
    Ok(STANDARD.decode(text)?)
}

/// ISO-8601 date, with or without milliseconds
pub fn decode_date(text: &str) -> Result<DateTime<Utc>, FormatError> {
    date::parse_iso8601(text)
}

impl Decode for String {
    #[inline]
    fn decode(text: &str) -> Result<Self, FormatError> {
        Ok(text.to_string())
    }
}

impl Decode for bool {
    #[inline]
    fn decode(text: &str) -> Result<Self, FormatError> {
        Ok(decode_boolean(text))
    }
}

impl Decode for BigDecimal {
    fn decode(text: &str) -> Result<Self, FormatError> {
        decode_big_decimal(text)
    }
}

impl Decode for BigInt {
    fn decode(text: &str) -> Result<Self, FormatError> {
        decode_big_integer(text)
    }
}

/// Base64 content
impl Decode for Vec<u8> {
    fn decode(text: &str) -> Result<Self, FormatError> {
        decode_byte_buffer(text)
    }
}

impl Decode for DateTime<Utc> {
    fn decode(text: &str) -> Result<Self, FormatError> {
        decode_date(text)
    }
}

/// Target type selector for tagged dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Boolean,
    ByteBuffer,
    /// ISO-8601 text
    Date,
    /// Seconds since the epoch, as JSON protocols send dates
    EpochTimestamp,
}

/// Decoded primitive value
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(String),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigDecimal(BigDecimal),
    BigInteger(BigInt),
    Boolean(bool),
    ByteBuffer(Vec<u8>),
    Date(DateTime<Utc>),
}

impl PrimitiveKind {
    /// Decode `text` with the decoder for this kind
    pub fn decode(self, text: &str) -> Result<Primitive, FormatError> {
        Ok(match self {
            PrimitiveKind::String => Primitive::String(text.to_string()),
            PrimitiveKind::Byte => Primitive::Byte(decode_byte(text)?),
            PrimitiveKind::Short => Primitive::Short(decode_short(text)?),
            PrimitiveKind::Integer => Primitive::Integer(decode_integer(text)?),
            PrimitiveKind::Long => Primitive::Long(decode_long(text)?),
            PrimitiveKind::Float => Primitive::Float(decode_float(text)?),
            PrimitiveKind::Double => Primitive::Double(decode_double(text)?),
            PrimitiveKind::BigDecimal => Primitive::BigDecimal(decode_big_decimal(text)?),
            PrimitiveKind::BigInteger => Primitive::BigInteger(decode_big_integer(text)?),
            PrimitiveKind::Boolean => Primitive::Boolean(decode_boolean(text)),
            PrimitiveKind::ByteBuffer => Primitive::ByteBuffer(decode_byte_buffer(text)?),
            PrimitiveKind::Date => Primitive::Date(decode_date(text)?),
            PrimitiveKind::EpochTimestamp => Primitive::Date(date::parse_epoch_seconds(text)?),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::BigDecimal => "bigdecimal",
            PrimitiveKind::BigInteger => "biginteger",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::ByteBuffer => "bytebuffer",
            PrimitiveKind::Date => "date",
            PrimitiveKind::EpochTimestamp => "epoch-timestamp",
        }
    }
}
