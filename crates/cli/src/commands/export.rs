//! Report export command.
//!
//! # Usage
//!
//! ```bash
//! # Export yesterday's daily report
//! sm-cli export daily
//!
//! # Export the week ending on a given date
//! sm-cli export weekly --date 2024-03-03 --data store.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `SHEETS_ACCESS_TOKEN` - Google Sheets bearer token
//! - `REPORT_{PERIOD}_ENABLED` / `REPORT_{PERIOD}_SPREADSHEET_ID` - Destination
//! - `REPORT_DATA_FILE` - Store snapshot (unless `--data` is given)

use std::path::Path;

use chrono::NaiveDate;
use storemetrics_core::Period;
use storemetrics_reporting::{ExportOutcome, GoogleSheetsClient, ReportExporter, ReportingConfig};

use super::{CommandError, load_store};

/// Export one report and print the outcome as JSON.
pub async fn run(
    period: Period,
    date: Option<NaiveDate>,
    data: Option<&Path>,
) -> Result<(), CommandError> {
    let config = ReportingConfig::from_env()?;
    // Fail on configuration before touching the store.
    config.destination(period)?;
    let writer = GoogleSheetsClient::from_config(config.require_sheets()?);
    let store = load_store(&config, data)?;

    let exporter = ReportExporter::new(store, writer, config);
    let outcome = exporter.export_report(period, date).await?;

    print_outcome(&outcome)
}

#[allow(clippy::print_stdout)]
fn print_outcome(outcome: &ExportOutcome) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}
