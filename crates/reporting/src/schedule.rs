//! When scheduled exports run and which day they report on.
//!
//! The trigger itself (cron, systemd timer, ...) lives outside this crate;
//! these helpers only compute the times it should fire.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use storemetrics_core::Period;

/// Next midnight at which `period` is due, strictly after `now`.
///
/// - daily: every midnight
/// - weekly: Monday midnight
/// - monthly: midnight on the first of the month
#[must_use]
pub fn next_run(period: Period, now: NaiveDateTime) -> NaiveDateTime {
    let tomorrow = now
        .date()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX);

    let day = match period {
        Period::Daily => tomorrow,
        Period::Weekly => {
            let ahead = (7 - tomorrow.weekday().num_days_from_monday()) % 7;
            tomorrow
                .checked_add_days(Days::new(u64::from(ahead)))
                .unwrap_or(NaiveDate::MAX)
        }
        Period::Monthly => now
            .date()
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .unwrap_or(NaiveDate::MAX),
    };

    day.and_time(NaiveTime::MIN)
}

/// Reference date used when an export is triggered without one: yesterday.
#[must_use]
pub fn default_reference_date(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}
