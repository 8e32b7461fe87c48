//! Date normalisation for activity and pantry timestamps.
//!
//! Timestamps reach us as native instants, free-form strings, or
//! Firestore-style `{seconds, nanoseconds}` objects. Everything funnels
//! through [`DateLike::to_local`] so callers never care which one they got.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::FoodItem;

/// Days ahead that still count as "expiring soon"
pub const DEFAULT_EXPIRY_THRESHOLD_DAYS: i64 = 7;

/// Offsets written without a colon, and `Date.toString()` output once its
/// trailing zone name is stripped
const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%a %b %d %Y %H:%M:%S GMT%z",
];

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DateLike {
    Native(DateTime<Utc>),
    Iso(String),
    Timestamp(FirestoreTimestamp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirestoreTimestamp {
    #[serde(alias = "_seconds")]
    pub seconds: i64,
    #[serde(default, alias = "_nanoseconds")]
    pub nanoseconds: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Timestamp(FirestoreTimestamp),
    Millis(i64),
    FloatMillis(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for DateLike {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawDate::deserialize(deserializer)? {
            RawDate::Timestamp(ts) => DateLike::Timestamp(ts),
            RawDate::Millis(ms) => from_millis(ms, || ms.to_string()),
            RawDate::FloatMillis(ms) if ms.is_finite() => {
                from_millis(ms.trunc() as i64, || ms.to_string())
            }
            RawDate::FloatMillis(ms) => DateLike::Iso(ms.to_string()),
            RawDate::Text(text) => DateLike::Iso(text),
            // Kept so the record survives; it just never parses.
            RawDate::Other(value) => DateLike::Iso(value.to_string()),
        })
    }
}

fn from_millis(ms: i64, fallback: impl FnOnce() -> String) -> DateLike {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => DateLike::Native(dt),
        None => DateLike::Iso(fallback()),
    }
}

impl DateLike {
    /// Normalise to a local instant, `None` when the value cannot be read as a date
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            DateLike::Native(dt) => Some(dt.with_timezone(&Local)),
            DateLike::Timestamp(ts) => Utc
                .timestamp_opt(ts.seconds, ts.nanoseconds)
                .single()
                .map(|dt| dt.with_timezone(&Local)),
            DateLike::Iso(text) => parse_date_text(text),
        }
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Local>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Local));
    }

    // "Fri Mar 15 2024 12:00:00 GMT+0000 (Coordinated Universal Time)"
    let without_zone_name = match text.find(" (") {
        Some(idx) if text.ends_with(')') => &text[..idx],
        _ => text,
    };
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(without_zone_name, format) {
            return Some(dt.with_timezone(&Local));
        }
    }

    // Date-time without offset is wall-clock time
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    // Slashed dates are local midnight, dashed ones are UTC midnight, same as the browser
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y/%m/%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// Calendar-local month, 0 = January
pub fn month_index(date: Option<&DateLike>) -> Option<usize> {
    date?.to_local().map(|dt| dt.month0() as usize)
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole calendar days from `today` until the date; negative once expired
pub fn days_until_expiration(date: &DateLike, today: NaiveDate) -> Option<i64> {
    date.to_local()
        .map(|dt| dt.date_naive().signed_duration_since(today).num_days())
}

pub fn is_expired(food: &FoodItem, today: NaiveDate) -> bool {
    food.expiration_date
        .as_ref()
        .and_then(|date| days_until_expiration(date, today))
        .map_or(false, |days| days < 0)
}

pub fn is_expiring_soon(food: &FoodItem, today: NaiveDate, threshold_days: i64) -> bool {
    food.expiration_date
        .as_ref()
        .and_then(|date| days_until_expiration(date, today))
        .map_or(false, |days| (0..=threshold_days).contains(&days))
}

/// `YYYY-MM-DD` in local time; empty for absent or unreadable dates
pub fn format_yyyy_mm_dd(date: Option<&DateLike>) -> String {
    date.and_then(DateLike::to_local)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
