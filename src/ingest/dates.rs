// src/ingest/dates.rs
//! Publish-time resolution for raw feed entries.
//!
//! Order: `published`, `updated`, `created` strings through a permissive
//! parser; then `published_parsed`, `updated_parsed` as unix seconds; else
//! the run time. All results are in Europe/Berlin.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Europe::Berlin, Tz};
use time::format_description::well_known::{Iso8601, Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::types::RawEntry;

/// Zone every timestamp is normalized into.
pub const DIGEST_TZ: Tz = Berlin;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S %z", "%a, %d %b %Y %H:%M %z"];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

pub fn to_digest_tz<T: TimeZone>(dt: DateTime<T>) -> DateTime<Tz> {
    dt.with_timezone(&DIGEST_TZ)
}

/// Resolve the publish time of `entry`, falling back to `now`.
pub fn resolve_published(entry: &RawEntry, now: DateTime<Tz>) -> DateTime<Tz> {
    let strings = [&entry.published, &entry.updated, &entry.created];
    if let Some(dt) = strings
        .into_iter()
        .flatten()
        .find_map(|s| parse_datetime(s))
    {
        return dt;
    }

    let structured = [entry.published_parsed, entry.updated_parsed];
    if let Some(dt) = structured.into_iter().flatten().find_map(from_unix) {
        return dt;
    }

    now
}

fn from_unix(secs: i64) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(to_digest_tz)
}

/// Permissive date parser. Zoned formats keep their offset, naive ones are
/// read as Berlin local time.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Tz>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // chrono's RFC 2822 parser also accepts obsolete zones (GMT, EST, ...)
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(to_digest_tz(dt));
    }
    for wk in [
        OffsetDateTime::parse(s, &Rfc3339),
        OffsetDateTime::parse(s, &Iso8601::DEFAULT),
        OffsetDateTime::parse(s, &Rfc2822),
    ] {
        if let Ok(odt) = wk {
            if let Some(dt) = from_unix(odt.unix_timestamp()) {
                return Some(dt);
            }
        }
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(to_digest_tz(dt));
        }
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    DIGEST_TZ.from_local_datetime(&naive).earliest()
}
