//! Shared codec state under parallel use
//!
//! The date formats are process-wide instances; parallel callers must see
//! exactly the results a single caller would.

use chrono::{DateTime, Duration, TimeZone, Utc};
use docpath::decode::{decode_big_decimal, decode_byte_buffer, decode_long};
use docpath::{
    format_compressed_iso8601, format_iso8601, format_rfc822, parse_compressed_iso8601,
    parse_iso8601, parse_rfc822, JsonCursor, XmlCursor,
};
use rayon::prelude::*;

fn instants(count: i64) -> Vec<DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| base + Duration::milliseconds(i * 7_919_861))
        .collect()
}

#[test]
fn test_parallel_iso8601_round_trips() {
    let dates = instants(10_000);
    let results: Vec<_> = dates
        .par_iter()
        .map(|date| {
            let text = format_iso8601(date);
            (text.clone(), parse_iso8601(&text).unwrap())
        })
        .collect();

    for (date, (text, parsed)) in dates.iter().zip(results) {
        assert_eq!(text, date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string());
        assert_eq!(&parsed, date);
    }
}

#[test]
fn test_parallel_mixed_formats() {
    let dates: Vec<_> = instants(5_000)
        .into_iter()
        .map(|d| d - Duration::milliseconds(i64::from(d.timestamp_subsec_millis())))
        .collect();

    dates.par_iter().enumerate().for_each(|(i, date)| match i % 3 {
        0 => assert_eq!(&parse_rfc822(&format_rfc822(date)).unwrap(), date),
        1 => assert_eq!(&parse_compressed_iso8601(&format_compressed_iso8601(date)).unwrap(), date),
        _ => {
            let text = date.format("%Y-%m-%dT%H:%M:%SZ").to_string();
            assert_eq!(&parse_iso8601(&text).unwrap(), date);
        }
    });
}

#[test]
fn test_parallel_cursors() {
    let documents: Vec<(usize, String, String)> = (0..500)
        .map(|i| {
            let xml = format!(
                "<r><id>{i}</id><amount>{i}.25</amount><blob>SGVsbG8=</blob><at>2013-11-29T23:37:45.{:03}Z</at></r>",
                i % 1000
            );
            let json = format!(
                r#"{{"r": {{"id": {i}, "amount": {i}.25, "blob": "SGVsbG8=", "at": "2013-11-29T23:37:45.{:03}Z"}}}}"#,
                i % 1000
            );
            (i, xml, json)
        })
        .collect();

    documents.par_iter().for_each(|(i, xml, json)| {
        let mut xml_cursor = XmlCursor::xml(xml);
        xml_cursor.register_metadata_expression("id", 1, "id");
        xml_cursor.register_metadata_expression("at", 1, "at");
        while !xml_cursor.advance().unwrap().is_end_document() {}

        let mut json_cursor = JsonCursor::json(json);
        json_cursor.register_metadata_expression("id", 1, "id");
        json_cursor.register_metadata_expression("at", 1, "at");
        while !json_cursor.advance().unwrap().is_end_document() {}

        for metadata in [xml_cursor.metadata(), json_cursor.metadata()] {
            assert_eq!(decode_long(&metadata["id"]).unwrap(), *i as i64);
            let at = parse_iso8601(&metadata["at"]).unwrap();
            assert_eq!(at.timestamp_subsec_millis() as usize, i % 1000);
        }
    });
}

#[test]
fn test_parallel_decoders() {
    let inputs: Vec<String> = (1..2_000).map(|i| format!("{i}.{i:04}")).collect();
    inputs.par_iter().for_each(|text| {
        let value = decode_big_decimal(text).unwrap();
        assert_eq!(value.to_string(), *text);
        assert_eq!(decode_byte_buffer("SGVsbG8=").unwrap(), b"Hello");
    });
}
