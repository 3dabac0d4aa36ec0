//! Store Metrics Reporting library.
//!
//! Computes daily, weekly and monthly business metrics from an
//! order/subscription store and exports them, with row-level detail, to a
//! spreadsheet.
//!
//! # Flow
//!
//! 1. [`resolve_window`] turns `(period, reference_date)` into a [`DateWindow`]
//! 2. [`Aggregator`] queries an [`OrderSource`] and computes a [`ReportResult`]
//! 3. [`format_report`] renders it into a flat [`Grid`]
//! 4. [`ReportExporter`] writes the grid through a [`SheetWriter`]
//!
//! Records matching the configured [`ExclusionRule`] are dropped from every
//! metric and every detail row.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregator;
pub mod config;
pub mod details;
pub mod error;
pub mod exclusion;
pub mod export;
pub mod formatter;
pub mod metrics;
pub mod report;
pub mod schedule;
pub mod sheets;
pub mod source;
pub mod window;

pub use aggregator::Aggregator;
pub use config::{ConfigError, PeriodSchedule, ReportingConfig, SheetsConfig};
pub use error::ExportError;
pub use exclusion::{ExclusionRule, SentinelName};
pub use export::{ExportOutcome, PreparedReport, ReportExporter};
pub use formatter::{Grid, format_report};
pub use report::{CancellationDetailRow, OrderDetailRow, ReportResult};
pub use schedule::{default_reference_date, next_run};
pub use sheets::{GoogleSheetsClient, SheetWriter, SheetsError, sheet_name};
pub use source::{DataSourceError, DateField, MemoryStore, OrderSource, Snapshot};
pub use window::{DateWindow, resolve_window};
