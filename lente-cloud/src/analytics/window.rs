//! Reporting window: business-timezone dates ↔ Unix millis
//!
//! All date → timestamp conversion happens here; the db layer only sees
//! `[start_ms, end_ms)` ranges.

use chrono::{Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use shared::error::{AppError, AppResult};
use shared::models::PeriodInfo;

/// Window used when the request carries no dates
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
/// Longest window a single request may ask for
pub const MAX_WINDOW_DAYS: i64 = 366;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Step used to find the end of a DST gap; every zone shifts by multiples of it
const GAP_STEP_MINUTES: i64 = 15;
/// Longest DST gap searched for
const MAX_GAP_MINUTES: i64 = 180;

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(field: &str, date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
        AppError::validation(format!("Invalid date format: {date}, expected YYYY-MM-DD"))
            .with_detail("field", field)
    })
}

/// Start of `date` in `tz` → Unix millis
///
/// When a DST gap swallows local midnight the day starts at the first local
/// instant that exists, so the millis still fall inside `date`.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    (0..=MAX_GAP_MINUTES)
        .step_by(GAP_STEP_MINUTES as usize)
        .find_map(|minutes| {
            (naive + Duration::minutes(minutes))
                .and_local_timezone(tz)
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// A closed range of calendar days plus the equally long period right before it
#[derive(Debug, Clone, PartialEq)]
pub struct ReportWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive
    pub start_ms: i64,
    /// Exclusive: midnight after `end_date`
    pub end_ms: i64,
    pub prev_start_date: NaiveDate,
    pub prev_end_date: NaiveDate,
    pub prev_start_ms: i64,
    /// Exclusive, equal to `start_ms`
    pub prev_end_ms: i64,
    tz: Tz,
}

impl ReportWindow {
    /// Build a window from explicit dates
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, tz: Tz) -> AppResult<Self> {
        if end_date < start_date {
            return Err(AppError::validation("endDate must not be before startDate")
                .with_detail("field", "endDate"));
        }

        let days = (end_date - start_date).num_days() + 1;
        if days > MAX_WINDOW_DAYS {
            return Err(AppError::validation(format!(
                "Reporting window of {days} days exceeds the maximum of {MAX_WINDOW_DAYS}"
            )));
        }

        let out_of_range =
            || AppError::validation("Reporting window is outside the supported dates");
        let after_end = end_date
            .checked_add_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        let prev_end_date = start_date
            .checked_sub_signed(Duration::days(1))
            .ok_or_else(out_of_range)?;
        let prev_start_date = start_date
            .checked_sub_signed(Duration::days(days))
            .ok_or_else(out_of_range)?;

        let start_ms = day_start_millis(start_date, tz);

        Ok(Self {
            start_date,
            end_date,
            start_ms,
            end_ms: day_start_millis(after_end, tz),
            prev_start_date,
            prev_end_date,
            prev_start_ms: day_start_millis(prev_start_date, tz),
            prev_end_ms: start_ms,
            tz,
        })
    }

    /// Resolve the optional `startDate`/`endDate` query pair
    ///
    /// Both absent → the last [`DEFAULT_WINDOW_DAYS`] days ending `today`.
    /// Only one present → validation error.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        tz: Tz,
    ) -> AppResult<Self> {
        match (start, end) {
            (Some(s), Some(e)) => {
                Self::new(parse_date("startDate", s)?, parse_date("endDate", e)?, tz)
            }
            (None, None) => Self::new(
                today - Duration::days(DEFAULT_WINDOW_DAYS - 1),
                today,
                tz,
            ),
            _ => Err(AppError::validation(
                "startDate and endDate must be given together",
            )),
        }
    }

    /// Number of calendar days in the window
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Every date of the window in order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }

    /// Business-timezone calendar date of a Unix-millis timestamp
    pub fn bucket(&self, ts_ms: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp_millis(ts_ms)
            .map(|dt| dt.with_timezone(&self.tz).date_naive())
    }

    pub fn contains(&self, ts_ms: i64) -> bool {
        ts_ms >= self.start_ms && ts_ms < self.end_ms
    }

    pub fn contains_previous(&self, ts_ms: i64) -> bool {
        ts_ms >= self.prev_start_ms && ts_ms < self.prev_end_ms
    }

    pub fn period_info(&self, branch_id: Option<i64>) -> PeriodInfo {
        PeriodInfo {
            start_date: self.start_date.format(DATE_FORMAT).to_string(),
            end_date: self.end_date.format(DATE_FORMAT).to_string(),
            previous_start_date: self.prev_start_date.format(DATE_FORMAT).to_string(),
            previous_end_date: self.prev_end_date.format(DATE_FORMAT).to_string(),
            days: self.days(),
            branch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_window_bounds_utc() {
        let w = ReportWindow::new(date("2026-03-01"), date("2026-03-10"), chrono_tz::UTC).unwrap();
        assert_eq!(w.days(), 10);
        assert_eq!(w.start_ms, 1_772_323_200_000);
        assert_eq!(w.end_ms - w.start_ms, 10 * 86_400_000);
        assert_eq!(w.prev_start_date, date("2026-02-19"));
        assert_eq!(w.prev_end_date, date("2026-02-28"));
        assert_eq!(w.prev_end_ms, w.start_ms);
        assert_eq!(w.start_ms - w.prev_start_ms, 10 * 86_400_000);
    }

    #[test]
    fn test_single_day_window() {
        let w = ReportWindow::new(date("2026-05-05"), date("2026-05-05"), chrono_tz::UTC).unwrap();
        assert_eq!(w.days(), 1);
        assert_eq!(w.dates().count(), 1);
        assert_eq!(w.prev_start_date, date("2026-05-04"));
        assert_eq!(w.prev_end_date, date("2026-05-04"));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err =
            ReportWindow::new(date("2026-05-05"), date("2026-05-01"), chrono_tz::UTC).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_too_long_window_rejected() {
        let err =
            ReportWindow::new(date("2024-01-01"), date("2025-12-31"), chrono_tz::UTC).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_resolve_default_window() {
        let today = date("2026-10-19");
        let w = ReportWindow::resolve(None, None, today, chrono_tz::UTC).unwrap();
        assert_eq!(w.end_date, today);
        assert_eq!(w.days(), DEFAULT_WINDOW_DAYS);
        assert_eq!(w.start_date, date("2026-09-20"));
    }

    #[test]
    fn test_resolve_requires_both_dates() {
        let today = date("2026-10-19");
        assert!(ReportWindow::resolve(Some("2026-10-01"), None, today, chrono_tz::UTC).is_err());
        assert!(ReportWindow::resolve(None, Some("2026-10-01"), today, chrono_tz::UTC).is_err());
    }

    #[test]
    fn test_resolve_bad_format() {
        let today = date("2026-10-19");
        let err =
            ReportWindow::resolve(Some("01/10/2026"), Some("2026-10-02"), today, chrono_tz::UTC)
                .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.details.unwrap().get("field").unwrap(), "startDate");
    }

    #[test]
    fn test_bucket_uses_business_timezone() {
        let tz: Tz = "Europe/Madrid".parse().unwrap();
        let w = ReportWindow::new(date("2026-01-10"), date("2026-01-11"), tz).unwrap();
        // 2026-01-10 23:30 UTC is already 2026-01-11 00:30 in Madrid (UTC+1)
        let ts = 1_768_087_800_000;
        assert_eq!(w.bucket(ts), Some(date("2026-01-11")));
        // window starts at Madrid midnight, 2026-01-09 23:00 UTC
        assert_eq!(w.start_ms, 1_767_999_600_000);
    }

    #[test]
    fn test_window_at_calendar_limits_rejected() {
        let today = date("2026-10-19");
        let last = NaiveDate::MAX.format(DATE_FORMAT).to_string();
        let last = Some(last.as_str());
        let err = ReportWindow::resolve(last, last, today, chrono_tz::UTC).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err =
            ReportWindow::new(NaiveDate::MIN, NaiveDate::MIN, chrono_tz::UTC).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_day_start_lands_on_its_own_day() {
        // Santiago and Havana skip local midnight when DST begins
        let zones: [Tz; 4] = [
            chrono_tz::America::Santiago,
            chrono_tz::America::Havana,
            chrono_tz::Asia::Beirut,
            chrono_tz::Europe::Madrid,
        ];
        let mut gaps = 0;
        for tz in zones {
            let w = ReportWindow::new(date("2026-01-01"), date("2026-12-31"), tz).unwrap();
            for day in w.dates() {
                let start = day_start_millis(day, tz);
                assert_eq!(w.bucket(start), Some(day), "{tz:?} {day}");
                assert_eq!(w.bucket(start - 1), day.pred_opt(), "{tz:?} {day}");
                if day.and_time(NaiveTime::MIN).and_local_timezone(tz).earliest().is_none() {
                    gaps += 1;
                }
            }
        }
        assert!(gaps > 0);
    }

    #[test]
    fn test_contains_is_half_open() {
        let w = ReportWindow::new(date("2026-03-01"), date("2026-03-01"), chrono_tz::UTC).unwrap();
        assert!(w.contains(w.start_ms));
        assert!(!w.contains(w.end_ms));
        assert!(w.contains_previous(w.start_ms - 1));
        assert!(!w.contains_previous(w.start_ms));
    }

    #[test]
    fn test_period_info() {
        let w = ReportWindow::new(date("2026-03-01"), date("2026-03-07"), chrono_tz::UTC).unwrap();
        let info = w.period_info(Some(3));
        assert_eq!(info.start_date, "2026-03-01");
        assert_eq!(info.end_date, "2026-03-07");
        assert_eq!(info.previous_start_date, "2026-02-22");
        assert_eq!(info.previous_end_date, "2026-02-28");
        assert_eq!(info.days, 7);
        assert_eq!(info.branch_id, Some(3));
    }
}
