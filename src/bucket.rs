// Due-date windows relative to the evaluation instant

use crate::query::DueDateRange;
use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveTime, Utc};

/// Precomputed boundaries for one due-date range
///
/// Day boundaries are local midnights in the offset of `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueWindow {
    range: DueDateRange,
    now: DateTime<Utc>,
    today_start: DateTime<Utc>,
    tomorrow_start: DateTime<Utc>,
    week_end: DateTime<Utc>,
    next_month_start: DateTime<Utc>,
}

impl DueWindow {
    pub fn new(range: DueDateRange, now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        let midnight = |date: NaiveDate| {
            date.and_time(NaiveTime::MIN)
                .and_local_timezone(offset)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        };

        let today = now.date_naive();
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        let week_end = today.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        let next_month = today
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .unwrap_or(NaiveDate::MAX);

        Self {
            range,
            now: now.with_timezone(&Utc),
            today_start: midnight(today),
            tomorrow_start: midnight(tomorrow),
            week_end: midnight(week_end),
            next_month_start: midnight(next_month),
        }
    }

    pub fn range(&self) -> DueDateRange {
        self.range
    }

    /// Whether a task with this due date passes the range
    ///
    /// Tasks without a due date are never constrained by a bucket; only
    /// `no-due-date` looks at absence, and it rejects every dated task.
    pub fn admits(&self, due: Option<DateTime<Utc>>) -> bool {
        let Some(due) = due else {
            return true;
        };

        match self.range {
            DueDateRange::Today => self.today_start <= due && due < self.tomorrow_start,
            DueDateRange::Week => self.today_start <= due && due <= self.week_end,
            DueDateRange::Month => self.today_start <= due && due < self.next_month_start,
            DueDateRange::Overdue => due < self.now,
            DueDateRange::NoDueDate => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn utc(rfc3339: &str) -> Option<DateTime<Utc>> {
        Some(at(rfc3339).with_timezone(&Utc))
    }

    // Wednesday afternoon, UTC+2
    const NOW: &str = "2026-04-15T14:30:00+02:00";

    #[test]
    fn test_today_bounds() {
        let window = DueWindow::new(DueDateRange::Today, at(NOW));
        assert!(window.admits(utc("2026-04-15T00:00:00+02:00")));
        assert!(window.admits(utc("2026-04-15T23:59:59+02:00")));
        assert!(window.admits(utc("2026-04-15T08:00:00+02:00")));
        assert!(!window.admits(utc("2026-04-16T00:00:00+02:00")));
        assert!(!window.admits(utc("2026-04-14T23:59:59+02:00")));
    }

    #[test]
    fn test_today_uses_local_midnight() {
        // 23:30 UTC on the 14th is 01:30 on the 15th at UTC+2
        let window = DueWindow::new(DueDateRange::Today, at(NOW));
        assert!(window.admits(utc("2026-04-14T23:30:00Z")));
        assert!(!window.admits(utc("2026-04-14T21:59:00Z")));
    }

    #[test]
    fn test_week_is_inclusive_of_sixth_day_start() {
        let window = DueWindow::new(DueDateRange::Week, at(NOW));
        assert!(window.admits(utc("2026-04-15T00:00:00+02:00")));
        assert!(window.admits(utc("2026-04-20T18:00:00+02:00")));
        assert!(window.admits(utc("2026-04-21T00:00:00+02:00")));
        assert!(!window.admits(utc("2026-04-21T00:00:01+02:00")));
        assert!(!window.admits(utc("2026-04-14T12:00:00+02:00")));
    }

    #[test]
    fn test_month_runs_to_end_of_month() {
        let window = DueWindow::new(DueDateRange::Month, at(NOW));
        assert!(window.admits(utc("2026-04-15T09:00:00+02:00")));
        assert!(window.admits(utc("2026-04-30T23:59:59+02:00")));
        assert!(!window.admits(utc("2026-05-01T00:00:00+02:00")));
        assert!(!window.admits(utc("2026-04-01T09:00:00+02:00")));
    }

    #[test]
    fn test_month_in_december_rolls_year() {
        let window = DueWindow::new(DueDateRange::Month, at("2026-12-20T10:00:00Z"));
        assert!(window.admits(utc("2026-12-31T23:00:00Z")));
        assert!(!window.admits(utc("2027-01-01T00:00:00Z")));
    }

    #[test]
    fn test_overdue_is_strictly_before_now() {
        let window = DueWindow::new(DueDateRange::Overdue, at(NOW));
        assert!(window.admits(utc("2026-04-15T14:29:59+02:00")));
        assert!(!window.admits(utc(NOW)));
        assert!(!window.admits(utc("2026-04-16T00:00:00+02:00")));
    }

    #[test]
    fn test_no_due_date_rejects_any_dated_task() {
        let window = DueWindow::new(DueDateRange::NoDueDate, at(NOW));
        assert!(window.admits(None));
        assert!(!window.admits(utc("2020-01-01T00:00:00Z")));
        assert!(!window.admits(utc(NOW)));
    }

    #[test]
    fn test_undated_task_passes_every_bucket() {
        for range in [
            DueDateRange::Today,
            DueDateRange::Week,
            DueDateRange::Month,
            DueDateRange::Overdue,
        ] {
            assert!(DueWindow::new(range, at(NOW)).admits(None), "{range}");
        }
    }
}
