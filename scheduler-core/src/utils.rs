//! Timestamp parsing and display formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::{StoreError, StoreResult};

/// Format used when rendering event dates for the scheduler UI.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Wall-clock formats accepted from clients, most common first.
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Render a stored timestamp as `YYYY-MM-DD hh:mm`.
pub fn format_display(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Parse a client-supplied timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` (space or `T` separator), RFC 3339 (converted
/// to UTC wall-clock) and a bare `YYYY-MM-DD`, which means midnight.
/// Sub-second precision is dropped so stored values compare as plain text.
pub fn parse_timestamp(s: &str) -> StoreResult<NaiveDateTime> {
    let s = s.trim();

    for format in INPUT_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(truncate_subsec(dt));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(truncate_subsec(dt.with_timezone(&Utc).naive_utc()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(StoreError::InvalidInput(format!(
        "Invalid timestamp '{}'. Expected YYYY-MM-DD HH:MM",
        s
    )))
}

fn truncate_subsec(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_scheduler_format() {
        assert_eq!(
            parse_timestamp("2025-03-20 15:30").unwrap(),
            at(2025, 3, 20, 15, 30, 0)
        );
    }

    #[test]
    fn test_parse_with_seconds_and_t_separator() {
        assert_eq!(
            parse_timestamp("2025-03-20T15:30:45").unwrap(),
            at(2025, 3, 20, 15, 30, 45)
        );
        assert_eq!(
            parse_timestamp(" 2025-03-20 15:30:45 ").unwrap(),
            at(2025, 3, 20, 15, 30, 45)
        );
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_timestamp("2025-03-20T17:30:00.250+02:00").unwrap(),
            at(2025, 3, 20, 15, 30, 0)
        );
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        assert_eq!(
            parse_timestamp("2025-03-20").unwrap(),
            at(2025, 3, 20, 0, 0, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_format_display_uses_24_hour_clock() {
        assert_eq!(format_display(&at(2025, 3, 20, 15, 5, 59)), "2025-03-20 15:05");
        assert_eq!(format_display(&at(2025, 1, 2, 0, 0, 0)), "2025-01-02 00:00");
    }
}
