//! Spreadsheet connection check.

use storemetrics_core::Period;
use storemetrics_reporting::{GoogleSheetsClient, ReportingConfig, SheetWriter};

use super::CommandError;

/// Fetch the title of `period`'s spreadsheet to verify token and access.
#[allow(clippy::print_stdout)]
pub async fn run(period: Period) -> Result<(), CommandError> {
    let config = ReportingConfig::from_env()?;
    let spreadsheet_id = config.destination(period)?;
    let client = GoogleSheetsClient::from_config(config.require_sheets()?);

    let title = client.spreadsheet_title(spreadsheet_id).await?;
    tracing::info!(spreadsheet_id, title = %title, "Connected to spreadsheet");
    println!("Connected to \"{title}\" ({spreadsheet_id})");
    Ok(())
}
