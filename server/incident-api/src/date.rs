//! Timestamp formatting for incident responses.
//!
//! Stored `date_time` values are read as local wall-clock time. Values that
//! carry an explicit offset are converted into the local zone first.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// Parse a stored timestamp to local wall-clock time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
  let s = s.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Local).naive_local());
  }
  for fmt in NAIVE_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
      return Some(dt);
    }
  }
  // A bare date is midnight UTC.
  let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
  let utc = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
  Some(utc.with_timezone(&Local).naive_local())
}

/// Zero-padded `YYYY-MM-DD`.
pub fn format_date(dt: &NaiveDateTime) -> String {
  dt.format("%Y-%m-%d").to_string()
}

/// Zero-padded 24-hour `HH:MM:SS`.
pub fn format_time(dt: &NaiveDateTime) -> String {
  dt.format("%H:%M:%S").to_string()
}
