use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Generate a new random ID (UUIDv4, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format a timestamp the way every stored timestamp is written.
///
/// Fixed precision and a `Z` suffix keep the strings lexicographically
/// ordered, so SQL range filters can compare them as text.
pub fn format_rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    format_rfc3339(Utc::now())
}

/// RFC 3339 string for `hours` before now. Used as a window lower bound.
///
/// `None` when the result falls outside the representable date range.
pub fn hours_ago_rfc3339(hours: i64) -> Option<String> {
    let span = TimeDelta::try_hours(hours)?;
    Utc::now().checked_sub_signed(span).map(format_rfc3339)
}

/// RFC 3339 string for the start of the current UTC day.
pub fn start_of_today_rfc3339() -> String {
    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now);
    format_rfc3339(midnight)
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
