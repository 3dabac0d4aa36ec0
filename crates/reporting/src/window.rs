//! Date windows for report periods.
//!
//! A window is an inclusive `[start, end]` range of store-local timestamps.
//! Windows are derived from `(period, reference_date)` on every call and
//! never cached.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use storemetrics_core::Period;

/// Last second of a day; windows are inclusive so this is the end bound.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("23:59:59 is a valid time"),
};

/// Inclusive timestamp range covered by one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl DateWindow {
    /// Create a window, returning `None` when `start > end`.
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Whole days from `first` 00:00:00 through `last` 23:59:59.
    #[must_use]
    pub fn days(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        Self::new(first.and_time(NaiveTime::MIN), last.and_time(END_OF_DAY))
    }

    /// Everything up to and including `end`.
    #[must_use]
    pub const fn ending_at(end: NaiveDateTime) -> Self {
        Self {
            start: NaiveDateTime::MIN,
            end,
        }
    }

    /// First instant in the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Last instant in the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Calendar date of the first instant.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Calendar date of the last instant.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Whether `ts` falls inside the window (both ends inclusive).
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Resolve the window a report for `period` covers on `reference_date`.
///
/// - daily: the reference day
/// - weekly: the reference day and the six days before it
/// - monthly: the full calendar month containing the reference day
#[must_use]
pub fn resolve_window(period: Period, reference_date: NaiveDate) -> DateWindow {
    let (first, last) = match period {
        Period::Daily => (reference_date, reference_date),
        Period::Weekly => (
            reference_date
                .checked_sub_days(Days::new(6))
                .unwrap_or(NaiveDate::MIN),
            reference_date,
        ),
        Period::Monthly => month_bounds(reference_date),
    };

    // first <= last holds for every arm, so this is always a full window.
    DateWindow::days(first, last).unwrap_or(DateWindow {
        start: reference_date.and_time(NaiveTime::MIN),
        end: reference_date.and_time(END_OF_DAY),
    })
}

/// First and last calendar day of the month containing `date`.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}
