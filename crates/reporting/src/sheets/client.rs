//! Google Sheets v4 REST client.
//!
//! Authenticates with a bearer access token obtained elsewhere; token
//! acquisition and refresh are not handled here.

use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::error::SheetsError;
use super::types::{
    BatchUpdateRequest, ErrorEnvelope, Request, SheetProperties, SpreadsheetInfo, ValueRange,
};
use super::{SheetWriter, cell_range};
use crate::config::SheetsConfig;

/// Client for creating and filling sheets in a Google spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    access_token: SecretString,
    api_base: String,
}

impl std::fmt::Debug for GoogleSheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsClient")
            .field("access_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl GoogleSheetsClient {
    /// Create a client against `api_base` (e.g. `https://sheets.googleapis.com/v4`).
    #[must_use]
    pub fn new(access_token: SecretString, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from loaded configuration.
    #[must_use]
    pub fn from_config(config: &SheetsConfig) -> Self {
        Self::new(config.access_token.clone(), config.api_base.clone())
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.api_base,
            urlencoding::encode(spreadsheet_id)
        )
    }

    /// Turn a non-success response into [`SheetsError::Api`].
    async fn check(response: Response) -> Result<Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| SheetsError::Response(e.to_string()))?;
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.describe())
            .unwrap_or(body);

        error!(status = status.as_u16(), message = %message, "Sheets API error");
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl SheetWriter for GoogleSheetsClient {
    #[instrument(skip(self), fields(spreadsheet_id = %spreadsheet_id, sheet = %sheet_name))]
    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<(), SheetsError> {
        let body = BatchUpdateRequest {
            requests: vec![Request::AddSheet {
                properties: SheetProperties {
                    title: sheet_name.to_string(),
                },
            }],
        };

        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet_id)))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;
        Self::check(response).await?;

        debug!("Sheet created");
        Ok(())
    }

    #[instrument(
        skip(self, grid),
        fields(spreadsheet_id = %spreadsheet_id, sheet = %sheet_name, rows = grid.len())
    )]
    async fn write_grid(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        grid: &[Vec<String>],
        top_left: &str,
    ) -> Result<(), SheetsError> {
        let range = cell_range(sheet_name, top_left);
        let body = ValueRange {
            range: &range,
            major_dimension: "ROWS",
            values: grid,
        };

        let response = self
            .client
            .put(format!(
                "{}/values/{}?valueInputOption=RAW",
                self.spreadsheet_url(spreadsheet_id),
                urlencoding::encode(&range)
            ))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;
        Self::check(response).await?;

        debug!(range = %range, "Grid written");
        Ok(())
    }

    #[instrument(skip(self), fields(spreadsheet_id = %spreadsheet_id))]
    async fn spreadsheet_title(&self, spreadsheet_id: &str) -> Result<String, SheetsError> {
        let response = self
            .client
            .get(format!(
                "{}?fields=properties.title",
                self.spreadsheet_url(spreadsheet_id)
            ))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| SheetsError::Request(e.to_string()))?;

        let info: SpreadsheetInfo = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| SheetsError::Response(e.to_string()))?;

        Ok(info.properties.title)
    }
}
