//! Date inputs and the `clock_in` windows derived from them. All UTC.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Duration,
    OffsetDateTime,
};

use crate::error::{AppError, AppResult};

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Half-open or closed window over `clock_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockInWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub end_inclusive: bool,
}

impl ClockInWindow {
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        at >= self.start && if self.end_inclusive { at <= self.end } else { at < self.end }
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation(format!("Invalid {field} format, expected YYYY-MM-DD")))
}

/// Parses an RFC 3339 timestamp with offset.
pub fn parse_timestamp(field: &str, raw: &str) -> AppResult<OffsetDateTime> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| AppError::validation(format!("Invalid {field} time format")))
}

pub fn format_date(at: OffsetDateTime) -> String {
    at.date()
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

fn day_start(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

fn add_days(at: OffsetDateTime, days: i64, field: &str) -> AppResult<OffsetDateTime> {
    at.checked_add(Duration::days(days))
        .ok_or_else(|| AppError::validation(format!("{field} out of range")))
}

/// Window for listings and reports: defaults to the last 30 days up to `now`.
/// An explicit end date covers that whole day, so the bound becomes the next
/// midnight (inclusive).
pub fn reporting_window(
    start: Option<Date>,
    end: Option<Date>,
    now: OffsetDateTime,
) -> AppResult<ClockInWindow> {
    let start = match start {
        Some(d) => day_start(d),
        None => add_days(now, -DEFAULT_LOOKBACK_DAYS, "start_date")?,
    };
    let end = match end {
        Some(d) => add_days(day_start(d), 1, "end_date")?,
        None => now,
    };
    Ok(ClockInWindow {
        start,
        end,
        end_inclusive: true,
    })
}

/// `[week_start, week_start + 7 days)`.
pub fn week_window(week_start: Date) -> AppResult<ClockInWindow> {
    let start = day_start(week_start);
    Ok(ClockInWindow {
        start,
        end: add_days(start, 7, "week_start")?,
        end_inclusive: false,
    })
}

/// `[first of the month, first of the next month)` for the month containing `now`.
pub fn month_window(now: OffsetDateTime) -> AppResult<ClockInWindow> {
    let today = now.date();
    let first = Date::from_calendar_date(today.year(), today.month(), 1)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let next_month = today.month().next();
    let next_year = if next_month == time::Month::January {
        today.year() + 1
    } else {
        today.year()
    };
    let next_first = Date::from_calendar_date(next_year, next_month, 1)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(ClockInWindow {
        start: day_start(first),
        end: day_start(next_first),
        end_inclusive: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn explicit_end_date_covers_the_whole_day() {
        let w = reporting_window(
            Some(date!(2025 - 05 - 01)),
            Some(date!(2025 - 05 - 10)),
            datetime!(2025-06-01 12:00 UTC),
        )
        .unwrap();
        assert!(w.contains(datetime!(2025-05-01 00:00 UTC)));
        assert!(w.contains(datetime!(2025-05-10 23:59:59.999 UTC)));
        assert!(!w.contains(datetime!(2025-04-30 23:59:59 UTC)));
        assert_eq!(format_date(w.end), "2025-05-11");
    }

    #[test]
    fn default_window_is_last_thirty_days() {
        let now = datetime!(2025-06-30 12:00 UTC);
        let w = reporting_window(None, None, now).unwrap();
        assert_eq!(w.start, datetime!(2025-05-31 12:00 UTC));
        assert_eq!(w.end, now);
        assert!(w.contains(now));
    }

    #[test]
    fn week_window_is_half_open() {
        let w = week_window(date!(2025 - 06 - 02)).unwrap();
        assert!(w.contains(datetime!(2025-06-02 00:00 UTC)));
        assert!(w.contains(datetime!(2025-06-08 23:59 UTC)));
        assert!(!w.contains(datetime!(2025-06-09 00:00 UTC)));
    }

    #[test]
    fn windows_past_the_last_representable_day_are_rejected() {
        let now = datetime!(2025-06-01 12:00 UTC);
        match reporting_window(None, Some(date!(9999 - 12 - 31)), now) {
            Err(AppError::Validation(m)) => assert_eq!(m, "end_date out of range"),
            other => panic!("unexpected: {other:?}"),
        }
        match week_window(date!(9999 - 12 - 28)) {
            Err(AppError::Validation(m)) => assert_eq!(m, "week_start out of range"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(reporting_window(Some(date!(9999 - 12 - 31)), None, now).is_ok());
        assert!(week_window(date!(9999 - 12 - 24)).is_ok());
    }

    #[test]
    fn month_window_rolls_over_december() {
        let w = month_window(datetime!(2025-12-15 10:00 UTC)).unwrap();
        assert_eq!(w.start, datetime!(2025-12-01 00:00 UTC));
        assert_eq!(w.end, datetime!(2026-01-01 00:00 UTC));
        assert!(!w.contains(w.end));
    }

    #[test]
    fn malformed_inputs_are_validation_errors() {
        assert!(matches!(
            parse_date("start_date", "05/01/2025"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_timestamp("clock_in", "2025-05-01 09:00"),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            parse_timestamp("clock_in", "2025-05-01T09:00:00+02:00").unwrap(),
            datetime!(2025-05-01 07:00 UTC)
        );
    }
}
