//! Display timestamps
//!
//! Every rendered instant goes through [`format_instant`] so the connector
//! shapes and the JSON API never disagree on the same moment.

use chrono::{DateTime, Utc};
use chrono_tz::Asia::Shanghai;
use mongodb::bson::{self, Bson};

/// `2024/1/5 08:03:09` in China Standard Time
pub const DISPLAY_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Shanghai).format(DISPLAY_FORMAT).to_string()
}

pub fn format_unix_seconds(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(format_instant)
}

pub fn format_bson_datetime(value: bson::DateTime) -> Option<String> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).map(format_instant)
}

/// Render whatever a document stores as a time.
///
/// BSON datetimes and unix seconds are formatted; RFC 3339 strings are
/// normalised and any other string passes through untouched. `None` means
/// the value carries no usable time at all.
pub fn format_bson(value: &Bson) -> Option<String> {
    match value {
        Bson::DateTime(dt) => format_bson_datetime(*dt),
        Bson::Int32(n) => format_unix_seconds(i64::from(*n)),
        Bson::Int64(n) => format_unix_seconds(*n),
        Bson::Double(f) if f.is_finite() => format_unix_seconds(*f as i64),
        Bson::Timestamp(ts) => format_unix_seconds(i64::from(ts.time)),
        Bson::String(s) if s.is_empty() => None,
        Bson::String(s) => Some(
            DateTime::parse_from_rfc3339(s)
                .map(|dt| format_instant(dt.with_timezone(&Utc)))
                .unwrap_or_else(|_| s.clone()),
        ),
        _ => None,
    }
}
