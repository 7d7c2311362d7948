//! Time helpers for date-range filters
//!
//! Date string to timestamp conversion happens in the API handler layer;
//! repositories only ever receive `i64` Unix millis. Day boundaries are
//! computed in UTC.

use chrono::{DateTime, NaiveDate, Utc};

use super::{AppError, AppResult};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// `YYYYMMDD` stamp for a Unix-millis timestamp, UTC.
///
/// Session and report numbers embed this as their date component.
pub fn date_stamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format("%Y%m%d")
        .to_string()
}

/// Start of day (00:00:00 UTC) as Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp_millis()
}

/// End of day as the next day's 00:00:00 UTC in Unix millis
///
/// Callers use `< end` (exclusive) so the whole named day is included.
pub fn day_end_millis(date: NaiveDate) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day)
}

/// Parse an optional `start_date`/`end_date` filter pair.
///
/// Both must be present and valid for the range to apply; anything else
/// degrades to `None` (no date filtering).
pub fn parse_date_range(start: &Option<String>, end: &Option<String>) -> Option<(i64, i64)> {
    match (start, end) {
        (Some(s), Some(e)) => {
            let start_date = parse_date(s).ok()?;
            let end_date = parse_date(e).ok()?;
            Some((day_start_millis(start_date), day_end_millis(end_date)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-03-14").is_ok());
        assert!(parse_date("2025-3-14").is_err());
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_date_stamp() {
        // 2025-01-01T00:00:00Z
        assert_eq!(date_stamp(1735689600000), "20250101");
        // One millisecond before midnight stays on the same day
        assert_eq!(date_stamp(1735689600000 + 24 * 60 * 60 * 1000 - 1), "20250101");
        assert_eq!(date_stamp(1735689600000 + 24 * 60 * 60 * 1000), "20250102");
    }

    #[test]
    fn test_day_bounds() {
        let date = parse_date("2025-01-01").unwrap();
        let start = day_start_millis(date);
        let end = day_end_millis(date);
        assert_eq!(start, 1735689600000); // 2025-01-01T00:00:00Z
        assert_eq!(end - start, 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_parse_date_range_requires_both() {
        assert!(parse_date_range(&Some("2025-01-01".into()), &None).is_none());
        assert!(parse_date_range(&None, &Some("2025-01-02".into())).is_none());
        assert!(parse_date_range(&None, &None).is_none());

        let (start, end) =
            parse_date_range(&Some("2025-01-01".into()), &Some("2025-01-02".into())).unwrap();
        assert!(end > start);
        assert_eq!(end - start, 2 * 24 * 60 * 60 * 1000);
    }

    #[test]
    fn test_parse_date_range_invalid_degrades() {
        assert!(parse_date_range(&Some("garbage".into()), &Some("2025-01-02".into())).is_none());
        assert!(parse_date_range(&Some("2025-01-01".into()), &Some("garbage".into())).is_none());
    }
}
