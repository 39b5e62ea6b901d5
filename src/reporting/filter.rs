//! Report filter: the validated date range (+ optional user) driving one
//! dashboard build.

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("date_from {from} is after date_to {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
    #[error("user_id must be a positive integer, got {0}")]
    InvalidUser(i64),
}

/// Immutable filter constructed once per request and shared by reference
/// across every sub-query of a dashboard build.
///
/// Absent `user_id` means "all users".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    date_from: NaiveDate,
    date_to: NaiveDate,
    user_id: Option<i64>,
}

impl ReportFilter {
    /// Validate and build a filter. Rejected inputs never reach the store.
    pub fn new(
        date_from: NaiveDate,
        date_to: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<Self, FilterError> {
        if date_from > date_to {
            return Err(FilterError::InvertedRange {
                from: date_from,
                to: date_to,
            });
        }
        if let Some(id) = user_id {
            if id <= 0 {
                return Err(FilterError::InvalidUser(id));
            }
        }
        Ok(Self {
            date_from,
            date_to,
            user_id,
        })
    }

    /// Trailing window ending today (UTC): `[today - days, today]`.
    pub fn trailing_days(days: u64, user_id: Option<i64>) -> Result<Self, FilterError> {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Self::new(from, today, user_id)
    }

    /// Same trailing window, keeping this filter's already-validated user.
    pub fn with_trailing_window(&self, days: u64) -> Self {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Self {
            date_from: from,
            date_to: today,
            user_id: self.user_id,
        }
    }

    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    /// First instant of the range as unix seconds (00:00:00 UTC on `date_from`).
    pub fn range_start_unix(&self) -> i64 {
        self.date_from.and_time(NaiveTime::MIN).and_utc().timestamp()
    }

    /// First instant *after* the range as unix seconds (00:00:00 UTC on the
    /// day following `date_to`). Half-open on this end, so a visit at
    /// 23:59:59 on `date_to` is inside the range and one at midnight the
    /// next day is not.
    pub fn range_end_unix(&self) -> i64 {
        let next = self
            .date_to
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        next.and_time(NaiveTime::MIN).and_utc().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn accepts_single_day_range() {
        let f = ReportFilter::new(date("2025-09-01"), date("2025-09-01"), None).unwrap();
        assert_eq!(f.date_from(), f.date_to());
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ReportFilter::new(date("2025-09-08"), date("2025-09-01"), None).unwrap_err();
        assert!(matches!(err, FilterError::InvertedRange { .. }));
    }

    #[test]
    fn rejects_non_positive_user() {
        let err = ReportFilter::new(date("2025-09-01"), date("2025-09-07"), Some(0)).unwrap_err();
        assert!(matches!(err, FilterError::InvalidUser(0)));
    }

    #[test]
    fn unix_bounds_are_half_open_on_calendar_days() {
        let f = ReportFilter::new(date("2025-09-01"), date("2025-09-07"), None).unwrap();
        // 2025-09-01T00:00:00Z
        assert_eq!(f.range_start_unix(), 1756684800);
        // 2025-09-08T00:00:00Z, one past the last included second
        assert_eq!(f.range_end_unix(), 1757289600);
        assert_eq!(f.range_end_unix() - 1, 1757289599); // 2025-09-07T23:59:59Z
    }

    #[test]
    fn trailing_window_spans_requested_days() {
        let f = ReportFilter::trailing_days(7, Some(3)).unwrap();
        assert_eq!((f.date_to() - f.date_from()).num_days(), 7);
        assert_eq!(f.user_id(), Some(3));
    }
}
