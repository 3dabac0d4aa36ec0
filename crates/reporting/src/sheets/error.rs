//! Spreadsheet writer errors.

use thiserror::Error;

/// Errors that can occur when talking to the spreadsheet service.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// HTTP request failed before a response arrived.
    #[error("Sheets request failed: {0}")]
    Request(String),

    /// Failed to read or parse the response.
    #[error("Sheets response error: {0}")]
    Response(String),

    /// The service rejected the call.
    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },
}
