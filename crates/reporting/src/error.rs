//! Export error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::sheets::SheetsError;
use crate::source::DataSourceError;

/// Errors that abort an export.
///
/// An empty window is not an error; see [`crate::ExportOutcome::no_data`].
#[derive(Debug, Error)]
pub enum ExportError {
    /// Period disabled or destination missing; raised before any query.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The store could not be queried.
    #[error("data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// Creating or writing the sheet failed.
    #[error("spreadsheet error: {0}")]
    Sheets(#[from] SheetsError),
}
