//! Report export: aggregate, format and write to the destination sheet.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use storemetrics_core::Period;
use tracing::{error, info, instrument};

use crate::aggregator::Aggregator;
use crate::config::ReportingConfig;
use crate::error::ExportError;
use crate::formatter::{Grid, format_report};
use crate::report::ReportResult;
use crate::schedule::default_reference_date;
use crate::sheets::{DEFAULT_TOP_LEFT, SheetWriter, sheet_name};
use crate::source::OrderSource;

/// Result of one export, as reported to the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub success: bool,
    pub message: String,
    /// Net revenue of the exported window
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub gross_revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_members: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellations: Option<i64>,
}

impl ExportOutcome {
    /// Successful no-op: nothing qualified in the window.
    #[must_use]
    pub fn no_data(period: Period, reference_date: NaiveDate) -> Self {
        Self {
            success: true,
            message: format!("No data found for {period} report on {reference_date}"),
            revenue: Some(Decimal::ZERO),
            sheet_name: None,
            gross_revenue: None,
            new_members: None,
            cancellations: None,
        }
    }

    /// Successful export of `report` into `sheet_name`.
    #[must_use]
    pub fn exported(report: &ReportResult, sheet_name: String) -> Self {
        Self {
            success: true,
            message: format!(
                "{} report for {} exported to sheet '{sheet_name}'",
                report.period.title(),
                report.reference_date
            ),
            revenue: Some(report.net_revenue),
            sheet_name: Some(sheet_name),
            gross_revenue: Some(report.gross_revenue),
            new_members: Some(report.new_members),
            cancellations: Some(report.cancellations),
        }
    }

    /// Failed export, for triggers that report outcomes rather than errors.
    #[must_use]
    pub fn from_error(err: &ExportError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            revenue: None,
            sheet_name: None,
            gross_revenue: None,
            new_members: None,
            cancellations: None,
        }
    }
}

/// A report rendered but not yet written.
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub report: ReportResult,
    pub sheet_name: String,
    pub grid: Grid,
}

/// Drives aggregation, formatting and writing for one store and destination.
#[derive(Debug)]
pub struct ReportExporter<S, W> {
    aggregator: Aggregator<S>,
    writer: W,
    config: ReportingConfig,
}

impl<S: OrderSource, W: SheetWriter> ReportExporter<S, W> {
    /// Build an exporter; the exclusion rule comes from `config`.
    pub fn new(source: S, writer: W, config: ReportingConfig) -> Self {
        Self {
            aggregator: Aggregator::new(source, config.exclusion_rule()),
            writer,
            config,
        }
    }

    /// Aggregate and render a report without writing it.
    ///
    /// `reference_date` defaults to yesterday.
    ///
    /// # Errors
    ///
    /// Returns `DataSource` if the store cannot be queried.
    pub fn prepare(
        &self,
        period: Period,
        reference_date: Option<NaiveDate>,
    ) -> Result<PreparedReport, ExportError> {
        let reference_date = reference_date
            .unwrap_or_else(|| default_reference_date(Local::now().date_naive()));
        let report = self.aggregator.aggregate(period, reference_date)?;
        let sheet_name = sheet_name(period, &report.window);
        let grid = format_report(&report);
        Ok(PreparedReport {
            report,
            sheet_name,
            grid,
        })
    }

    /// Export the `period` report for `reference_date` (default: yesterday).
    ///
    /// When nothing qualifies in the window the export is a successful no-op
    /// and the writer is never called.
    ///
    /// # Errors
    ///
    /// - `Config` if the period is disabled or has no spreadsheet; no query
    ///   runs in that case
    /// - `DataSource` if the store cannot be queried
    /// - `Sheets` if creating or writing the sheet fails; not retried
    #[instrument(skip(self, period), fields(period = %period))]
    pub async fn export_report(
        &self,
        period: Period,
        reference_date: Option<NaiveDate>,
    ) -> Result<ExportOutcome, ExportError> {
        let spreadsheet_id = self.config.destination(period)?;

        let prepared = self.prepare(period, reference_date)?;
        let report = &prepared.report;

        if report.has_no_data() {
            info!(date = %report.reference_date, "No data in window, skipping export");
            return Ok(ExportOutcome::no_data(period, report.reference_date));
        }

        self.writer
            .create_sheet(spreadsheet_id, &prepared.sheet_name)
            .await
            .inspect_err(|e| {
                error!(date = %report.reference_date, error = %e, "Failed to create sheet");
            })?;
        self.writer
            .write_grid(
                spreadsheet_id,
                &prepared.sheet_name,
                &prepared.grid,
                DEFAULT_TOP_LEFT,
            )
            .await
            .inspect_err(|e| {
                error!(date = %report.reference_date, error = %e, "Failed to write report grid");
            })?;

        info!(
            date = %report.reference_date,
            sheet = %prepared.sheet_name,
            rows = prepared.grid.len(),
            net_revenue = %report.net_revenue,
            "Report exported"
        );

        Ok(ExportOutcome::exported(report, prepared.sheet_name.clone()))
    }
}
