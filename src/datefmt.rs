use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Stored timestamp shape, e.g. "2026-08-05 14:30"
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Stored date shape, e.g. "2026-08-05"
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Stored time shape, e.g. "14:30"
pub const TIME_FORMAT: &str = "%H:%M";

/// How many days ahead a due date counts as "due soon"
pub const DUE_SOON_DAYS: i64 = 30;

// chrono accepts non-padded fields ("2026-8-5"), which would break both
// lexicographic ordering and SQLite strftime grouping of the stored text.
// Each parser therefore also requires the canonical zero-padded form.

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .filter(|ts| ts.format(TIMESTAMP_FORMAT).to_string() == s)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .filter(|d| d.format(DATE_FORMAT).to_string() == s)
}

pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .ok()
        .filter(|t| t.format(TIME_FORMAT).to_string() == s)
}

/// Validates a report month filter, e.g. "2026-08"
pub fn is_valid_month(s: &str) -> bool {
    parse_date(&format!("{}-01", s)).is_some()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
