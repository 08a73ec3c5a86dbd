//! Date Codec
//!
//! Shared parse/format logic for the date formats found in service documents:
//!
//! | Format | Pattern | Use |
//! |--------|---------|-----|
//! | ISO-8601 with millis | `2013-11-29T23:37:45.123Z` | primary parse and format |
//! | ISO-8601 without millis | `2013-11-29T23:37:45Z` | parse fallback only |
//! | RFC-822 | `Fri, 29 Nov 2013 23:37:45 GMT` | headers |
//! | Compressed ISO-8601 | `20131129T233745Z` | clock skew diagnostics |
//!
//! Each format is a single shared instance whose parse buffer is reused
//! between calls. That state is not reentrant, so every parse and format call
//! takes the instance lock for exactly the duration of the call.

use crate::error::FormatError;
use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// A date format with lock-guarded scratch state
pub struct DateFormat {
    name: &'static str,
    pattern: &'static str,
    parsed: Mutex<Parsed>,
}

impl DateFormat {
    fn new(name: &'static str, pattern: &'static str) -> Self {
        DateFormat {
            name,
            pattern,
            parsed: Mutex::new(Parsed::new()),
        }
    }

    /// Human readable format name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// strftime pattern
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Parse `text` as a UTC instant
    pub fn parse(&self, text: &str) -> Result<DateTime<Utc>, FormatError> {
        let mut parsed = self.parsed.lock();
        *parsed = Parsed::new();

        parse(&mut parsed, text, StrftimeItems::new(self.pattern))
            .and_then(|()| parsed.to_naive_datetime_with_offset(0))
            .map(|naive| naive.and_utc())
            .map_err(|source| FormatError::Date {
                text: text.to_string(),
                format: self.name,
                source,
            })
    }

    /// Format an instant in this format
    pub fn format(&self, date: &DateTime<Utc>) -> String {
        let _guard = self.parsed.lock();
        date.format(self.pattern).to_string()
    }
}

pub static ISO8601: Lazy<DateFormat> =
    Lazy::new(|| DateFormat::new("ISO-8601", "%Y-%m-%dT%H:%M:%S.%3fZ"));

pub static ISO8601_NO_MILLIS: Lazy<DateFormat> =
    Lazy::new(|| DateFormat::new("ISO-8601 (no milliseconds)", "%Y-%m-%dT%H:%M:%SZ"));

/// RFC-822 without the zone, which is handled separately
pub static RFC822: Lazy<DateFormat> =
    Lazy::new(|| DateFormat::new("RFC-822", "%a, %d %b %Y %H:%M:%S"));

pub static COMPRESSED_ISO8601: Lazy<DateFormat> =
    Lazy::new(|| DateFormat::new("compressed ISO-8601", "%Y%m%dT%H%M%SZ"));

/// Parse ISO-8601, with milliseconds first and without on failure
pub fn parse_iso8601(text: &str) -> Result<DateTime<Utc>, FormatError> {
    ISO8601.parse(text).or_else(|_| {
        tracing::trace!(text, "retrying date without milliseconds");
        ISO8601_NO_MILLIS.parse(text)
    })
}

/// Format as ISO-8601 with milliseconds
pub fn format_iso8601(date: &DateTime<Utc>) -> String {
    ISO8601.format(date)
}

/// Parse an RFC-822 date such as `Fri, 29 Nov 2013 23:37:45 GMT`
///
/// The zone may be `GMT`, `UTC`, `UT`, `Z` or a numeric `+hhmm` offset.
pub fn parse_rfc822(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let (stamp, zone) = match text.trim_end().rsplit_once(' ') {
        Some(parts) => parts,
        None => (text, ""),
    };
    let offset = parse_zone(zone).ok_or_else(|| FormatError::TimeZone {
        text: text.to_string(),
        zone: zone.to_string(),
    })?;

    let local = RFC822.parse(stamp).map_err(|err| match err {
        FormatError::Date { source, format, .. } => FormatError::Date {
            text: text.to_string(),
            format,
            source,
        },
        other => other,
    })?;

    let shifted = offset
        .from_local_datetime(&local.naive_utc())
        .single()
        .ok_or_else(|| FormatError::OutOfRange { text: text.to_string() })?;
    Ok(shifted.with_timezone(&Utc))
}

/// Format as RFC-822 in GMT
pub fn format_rfc822(date: &DateTime<Utc>) -> String {
    let mut formatted = RFC822.format(date);
    formatted.push_str(" GMT");
    formatted
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    match zone {
        "GMT" | "UTC" | "UT" | "Z" => return FixedOffset::east_opt(0),
        _ => {}
    }

    let bytes = zone.as_bytes();
    if bytes.len() != 5 || !bytes[1..].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let hours: i32 = zone[1..3].parse().ok()?;
    let minutes: i32 = zone[3..5].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;
    match bytes[0] {
        b'+' => FixedOffset::east_opt(seconds),
        b'-' => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

/// Parse a compressed ISO-8601 date such as `20131129T233745Z`
pub fn parse_compressed_iso8601(text: &str) -> Result<DateTime<Utc>, FormatError> {
    COMPRESSED_ISO8601.parse(text)
}

/// Format as compressed ISO-8601
pub fn format_compressed_iso8601(date: &DateTime<Utc>) -> String {
    COMPRESSED_ISO8601.format(date)
}

/// Parse `<seconds>[.<fraction>]` since the Unix epoch
///
/// The fraction is truncated to milliseconds.
pub fn parse_epoch_seconds(text: &str) -> Result<DateTime<Utc>, FormatError> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

    let seconds: i64 = whole.parse().map_err(|source| FormatError::EpochSeconds {
        text: text.to_string(),
        source,
    })?;

    let mut millis: i64 = 0;
    if !fraction.is_empty() {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::InvalidFraction { text: text.to_string() });
        }
        // ASCII digits only, so byte slicing stays on char boundaries
        let digits = &fraction.as_bytes()[..fraction.len().min(3)];
        let value = digits
            .iter()
            .fold(0_i64, |acc, &b| acc * 10 + i64::from(b - b'0'));
        millis = value * 10_i64.pow(3 - digits.len() as u32);
    }
    if whole.starts_with('-') {
        millis = -millis;
    }

    seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| FormatError::OutOfRange { text: text.to_string() })
}
