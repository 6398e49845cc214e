use crate::services::filter_service::SortOrder;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    // Tried in order; the first capture wins.
    static ref VIDEO_URL_PATTERNS: Vec<Regex> = [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)",
        r"youtube\.com/watch\?.*v=([^&\n?#]+)",
        r"youtu\.be/([^&\n?#]+)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect();
    static ref BARE_VIDEO_ID: Option<Regex> = Regex::new(r"^[a-zA-Z0-9_-]{11}$").ok();
}

/// Accepts watch, short-link and embed URLs, or a bare 11 character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    for pattern in VIDEO_URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|c| c.get(1)) {
            return Some(id.as_str().to_string());
        }
    }

    BARE_VIDEO_ID
        .as_ref()
        .filter(|re| re.is_match(input))
        .map(|_| input.to_string())
}

/// Parse an ISO8601 timestamp into milliseconds since the epoch.
pub fn parse_timestamp_millis(date_str: &str) -> Option<i64> {
    if date_str.is_empty() {
        return None;
    }
    date_str
        .parse::<DateTime<Utc>>()
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Parse ISO8601 date string to a sortable timestamp, 0 when unparseable
pub fn parse_iso8601_to_timestamp(date_str: &str) -> i64 {
    parse_timestamp_millis(date_str).unwrap_or(0)
}

/// Full timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date_bound(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = value.parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn compare_with_order_int(a: i128, b: i128, order: &SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.cmp(&b),
        SortOrder::Desc => b.cmp(&a),
    }
}
