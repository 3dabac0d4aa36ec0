//! Show export schedules.

use chrono::Local;
use storemetrics_core::Period;
use storemetrics_reporting::{ReportingConfig, next_run};

use super::CommandError;

/// Print each period's settings and next run time.
#[allow(clippy::print_stdout)]
pub fn run() -> Result<(), CommandError> {
    let config = ReportingConfig::from_env()?;
    let now = Local::now().naive_local();

    for period in Period::ALL {
        let schedule = config.schedule(period);
        let status = if schedule.enabled { "enabled" } else { "disabled" };
        println!(
            "{:<8} {:<9} spreadsheet={:<20} next={}",
            period.as_str(),
            status,
            schedule.spreadsheet_id.as_deref().unwrap_or("-"),
            next_run(period, now)
        );
    }
    Ok(())
}
