//! Timestamps are stored as RFC 3339 UTC text with a fixed microsecond
//! precision, so ordering by the column text is chronological.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

pub fn to_db(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn from_db(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        // Rows written by hand with SQLite's datetime('now') have no zone.
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}
