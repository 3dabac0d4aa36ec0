//! Render a report without writing it.
//!
//! Prints the grid as tab-separated values, one line per row, under the
//! name of the sheet an export would create.

use std::path::Path;

use chrono::{Local, NaiveDate};
use storemetrics_core::Period;
use storemetrics_reporting::{
    Aggregator, Grid, ReportingConfig, default_reference_date, format_report, sheet_name,
};

use super::{CommandError, load_store};

/// Aggregate and print a report.
pub fn run(
    period: Period,
    date: Option<NaiveDate>,
    data: Option<&Path>,
) -> Result<(), CommandError> {
    let config = ReportingConfig::from_env()?;
    let store = load_store(&config, data)?;
    let aggregator = Aggregator::new(store, config.exclusion_rule());

    let date = date.unwrap_or_else(|| default_reference_date(Local::now().date_naive()));
    let report = aggregator.aggregate(period, date)?;
    let name = sheet_name(period, &report.window);

    tracing::info!(sheet = %name, empty = report.has_no_data(), "Report rendered");
    print_grid(&name, &format_report(&report));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_grid(sheet_name: &str, grid: &Grid) {
    println!("# {sheet_name}");
    for row in grid {
        println!("{}", row.join("\t"));
    }
}
