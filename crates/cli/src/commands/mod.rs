//! Command implementations.

pub mod connection;
pub mod export;
pub mod preview;
pub mod schedule;

use std::path::{Path, PathBuf};

use storemetrics_reporting::{
    ConfigError, DataSourceError, ExportError, MemoryStore, ReportingConfig, SheetsError,
};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded or is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No store snapshot given on the command line or in the environment.
    #[error("No data file: pass --data or set REPORT_DATA_FILE")]
    MissingDataFile,

    /// The store snapshot could not be loaded.
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// The export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The spreadsheet service could not be reached.
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// Output could not be serialized.
    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Load the store snapshot from `--data`, falling back to `REPORT_DATA_FILE`.
pub fn load_store(
    config: &ReportingConfig,
    data: Option<&Path>,
) -> Result<MemoryStore, CommandError> {
    let path: PathBuf = data
        .map(Path::to_path_buf)
        .or_else(|| config.data_file.clone())
        .ok_or(CommandError::MissingDataFile)?;

    tracing::info!(path = %path.display(), "Loading store snapshot");
    Ok(MemoryStore::from_path(&path)?)
}
