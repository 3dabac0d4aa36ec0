//! Spreadsheet export target.
//!
//! This module provides:
//! - [`SheetWriter`], the seam the exporter writes through
//! - [`GoogleSheetsClient`], the Google Sheets v4 implementation
//! - Sheet naming and A1 range helpers

mod client;
mod error;
mod types;

use std::future::Future;

use storemetrics_core::Period;

pub use client::GoogleSheetsClient;
pub use error::SheetsError;

use crate::window::DateWindow;

/// Top-left cell every report grid is written to.
pub const DEFAULT_TOP_LEFT: &str = "A1";

/// Writes report grids into named sheets of a spreadsheet.
pub trait SheetWriter {
    /// Add a new sheet (tab) called `sheet_name`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn create_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> impl Future<Output = Result<(), SheetsError>> + Send;

    /// Write `grid` into `sheet_name` starting at `top_left` (A1 notation).
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn write_grid(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        grid: &[Vec<String>],
        top_left: &str,
    ) -> impl Future<Output = Result<(), SheetsError>> + Send;

    /// Title of the spreadsheet, used to check credentials and access.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or API failure.
    fn spreadsheet_title(
        &self,
        spreadsheet_id: &str,
    ) -> impl Future<Output = Result<String, SheetsError>> + Send;
}

impl<T: SheetWriter + Sync + ?Sized> SheetWriter for &T {
    fn create_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> impl Future<Output = Result<(), SheetsError>> + Send {
        (**self).create_sheet(spreadsheet_id, sheet_name)
    }

    fn write_grid(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        grid: &[Vec<String>],
        top_left: &str,
    ) -> impl Future<Output = Result<(), SheetsError>> + Send {
        (**self).write_grid(spreadsheet_id, sheet_name, grid, top_left)
    }

    fn spreadsheet_title(
        &self,
        spreadsheet_id: &str,
    ) -> impl Future<Output = Result<String, SheetsError>> + Send {
        (**self).spreadsheet_title(spreadsheet_id)
    }
}

/// Name of the sheet a report is written to.
///
/// Daily sheets are named by the ISO reference date; weekly and monthly
/// sheets by their window bounds.
#[must_use]
pub fn sheet_name(period: Period, window: &DateWindow) -> String {
    match period {
        Period::Daily => window.end_date().to_string(),
        Period::Weekly => format!("Week {} to {}", window.start_date(), window.end_date()),
        Period::Monthly => format!("Month {} to {}", window.start_date(), window.end_date()),
    }
}

/// A1 range for `top_left` inside `sheet_name`, with the sheet name quoted.
#[must_use]
pub fn cell_range(sheet_name: &str, top_left: &str) -> String {
    format!("'{}'!{top_left}", sheet_name.replace('\'', "''"))
}
