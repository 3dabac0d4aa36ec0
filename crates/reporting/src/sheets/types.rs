//! Request and response bodies for the Google Sheets v4 API.
//!
//! Only the fields the writer needs are modelled.

use serde::{Deserialize, Serialize};

/// `spreadsheets.batchUpdate` request body.
#[derive(Debug, Clone, Serialize)]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,
}

/// A single batch update request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet { properties: SheetProperties },
}

/// Properties of a sheet (tab) inside a spreadsheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetProperties {
    pub title: String,
}

/// `spreadsheets.values.update` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange<'a> {
    pub range: &'a str,
    pub major_dimension: &'static str,
    pub values: &'a [Vec<String>],
}

/// Subset of `spreadsheets.get` used for connection checks.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetInfo {
    pub properties: SpreadsheetProperties,
}

/// Spreadsheet-level properties.
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetProperties {
    pub title: String,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

/// Error payload inside [`ErrorEnvelope`].
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ErrorDetail {
    /// Message prefixed with the API status code name when present,
    /// e.g. `PERMISSION_DENIED: The caller does not have permission`.
    #[must_use]
    pub fn describe(self) -> String {
        match self.status {
            Some(status) if !status.is_empty() => format!("{status}: {}", self.message),
            _ => self.message,
        }
    }
}
