//! Reporting configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Sheets (required for exporting)
//! - `SHEETS_ACCESS_TOKEN` - OAuth bearer token for the Google Sheets API
//! - `SHEETS_API_BASE` - API base URL (default: <https://sheets.googleapis.com/v4>)
//!
//! ## Schedules (per period: `DAILY`, `WEEKLY`, `MONTHLY`)
//! - `REPORT_{PERIOD}_ENABLED` - Whether the period is exported (default: false)
//! - `REPORT_{PERIOD}_SPREADSHEET_ID` - Destination spreadsheet
//!
//! ## Exclusion (optional)
//! - `REPORT_EXCLUDED_EMAIL` - Billing email of the internal/test account
//! - `REPORT_EXCLUDED_FIRST_NAME` / `REPORT_EXCLUDED_LAST_NAME` - Billing
//!   name of the internal/test account (both or neither)
//!
//! ## Data
//! - `REPORT_DATA_FILE` - JSON or YAML store snapshot read by the CLI

use std::path::PathBuf;

use secrecy::SecretString;
use storemetrics_core::{Email, Period};
use thiserror::Error;

use crate::exclusion::{ExclusionRule, SentinelName};

const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Blocklist of common placeholder patterns (case-insensitive).
///
/// Limited to phrases that do not turn up inside random token text.
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "placeholder", "put-your"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("{0} reports are disabled")]
    PeriodDisabled(Period),
    #[error("No spreadsheet configured for {0} reports")]
    MissingSpreadsheet(Period),
}

/// Google Sheets API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct SheetsConfig {
    /// OAuth bearer token
    pub access_token: SecretString,
    /// API base URL without trailing slash
    pub api_base: String,
}

impl std::fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("access_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Export settings for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodSchedule {
    pub enabled: bool,
    pub spreadsheet_id: Option<String>,
}

/// Reporting configuration.
#[derive(Debug, Clone, Default)]
pub struct ReportingConfig {
    /// Sheets API access (absent when no token is configured)
    pub sheets: Option<SheetsConfig>,
    pub daily: PeriodSchedule,
    pub weekly: PeriodSchedule,
    pub monthly: PeriodSchedule,
    /// Billing email of the account left out of every report
    pub excluded_email: Option<Email>,
    /// Billing name of the account left out of every report
    pub excluded_name: Option<SentinelName>,
    /// Store snapshot used by the CLI
    pub data_file: Option<PathBuf>,
}

impl ReportingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or a secret looks
    /// like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`ReportingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sheets = match get("SHEETS_ACCESS_TOKEN") {
            Some(token) => {
                validate_secret_strength(&token, "SHEETS_ACCESS_TOKEN")?;
                Some(SheetsConfig {
                    access_token: SecretString::from(token),
                    api_base: get("SHEETS_API_BASE")
                        .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string())
                        .trim_end_matches('/')
                        .to_string(),
                })
            }
            None => None,
        };

        let schedule = |period: Period| -> Result<PeriodSchedule, ConfigError> {
            let prefix = format!("REPORT_{}", period.as_str().to_uppercase());
            let enabled_key = format!("{prefix}_ENABLED");
            let enabled = match get(&enabled_key) {
                Some(value) => parse_bool(&enabled_key, &value)?,
                None => false,
            };
            Ok(PeriodSchedule {
                enabled,
                spreadsheet_id: get(&format!("{prefix}_SPREADSHEET_ID")),
            })
        };

        let excluded_email = get("REPORT_EXCLUDED_EMAIL")
            .map(|raw| {
                Email::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("REPORT_EXCLUDED_EMAIL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let excluded_name = match (
            get("REPORT_EXCLUDED_FIRST_NAME"),
            get("REPORT_EXCLUDED_LAST_NAME"),
        ) {
            (Some(first), Some(last)) => SentinelName::new(&first, &last),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "REPORT_EXCLUDED_*_NAME".to_string(),
                    "first and last name must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            sheets,
            daily: schedule(Period::Daily)?,
            weekly: schedule(Period::Weekly)?,
            monthly: schedule(Period::Monthly)?,
            excluded_email,
            excluded_name,
            data_file: get("REPORT_DATA_FILE").map(PathBuf::from),
        })
    }

    /// Settings for `period`.
    #[must_use]
    pub const fn schedule(&self, period: Period) -> &PeriodSchedule {
        match period {
            Period::Daily => &self.daily,
            Period::Weekly => &self.weekly,
            Period::Monthly => &self.monthly,
        }
    }

    /// Spreadsheet a `period` report is exported to.
    ///
    /// # Errors
    ///
    /// Returns `PeriodDisabled` or `MissingSpreadsheet` when the period
    /// cannot be exported.
    pub fn destination(&self, period: Period) -> Result<&str, ConfigError> {
        let schedule = self.schedule(period);
        if !schedule.enabled {
            return Err(ConfigError::PeriodDisabled(period));
        }
        schedule
            .spreadsheet_id
            .as_deref()
            .ok_or(ConfigError::MissingSpreadsheet(period))
    }

    /// Sheets settings, required by anything that talks to the API.
    ///
    /// # Errors
    ///
    /// Returns `MissingEnvVar` if no access token is configured.
    pub fn require_sheets(&self) -> Result<&SheetsConfig, ConfigError> {
        self.sheets
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHEETS_ACCESS_TOKEN".to_string()))
    }

    /// The exclusion rule built from the configured sentinels.
    #[must_use]
    pub fn exclusion_rule(&self) -> ExclusionRule {
        let mut rule = ExclusionRule::none();
        if let Some(email) = &self.excluded_email {
            rule = rule.with_email(email.clone());
        }
        if let Some(name) = &self.excluded_name {
            rule = rule.with_name(name.clone());
        }
        rule
    }
}

/// Parse a boolean flag value.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Reject secrets that are obviously placeholders.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use storemetrics_core::BillingDetails;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ReportingConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ReportingConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert!(config.sheets.is_none());
        assert!(!config.daily.enabled);
        assert!(config.exclusion_rule().is_empty());
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_schedules_and_destination() {
        let config = load(&[
            ("REPORT_DAILY_ENABLED", "true"),
            ("REPORT_DAILY_SPREADSHEET_ID", "sheet-daily"),
            ("REPORT_WEEKLY_ENABLED", "1"),
            ("REPORT_MONTHLY_SPREADSHEET_ID", "sheet-monthly"),
        ])
        .unwrap();

        assert_eq!(config.destination(Period::Daily).unwrap(), "sheet-daily");
        assert!(matches!(
            config.destination(Period::Weekly),
            Err(ConfigError::MissingSpreadsheet(Period::Weekly))
        ));
        assert!(matches!(
            config.destination(Period::Monthly),
            Err(ConfigError::PeriodDisabled(Period::Monthly))
        ));
    }

    #[test]
    fn test_invalid_bool_rejected() {
        let err = load(&[("REPORT_DAILY_ENABLED", "sometimes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "REPORT_DAILY_ENABLED"));
    }

    #[test]
    fn test_sheets_config_and_redaction() {
        let config = load(&[
            ("SHEETS_ACCESS_TOKEN", "ya29.a0AfB_byC9x"),
            ("SHEETS_API_BASE", "http://localhost:8080/v4/"),
        ])
        .unwrap();
        let sheets = config.require_sheets().unwrap();
        assert_eq!(sheets.api_base, "http://localhost:8080/v4");
        assert!(!format!("{sheets:?}").contains("ya29"));
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let err = load(&[("SHEETS_ACCESS_TOKEN", "your-token-here")]).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_random_token_text_accepted() {
        // Real bearer tokens are random base64url and may contain any letters.
        for token in ["ya29.a0AXXXb_TodoInsertReplace9", "ya29.xxxQ-Replace_k"] {
            let config = load(&[("SHEETS_ACCESS_TOKEN", token)]).unwrap();
            assert!(config.sheets.is_some());
        }
    }

    #[test]
    fn test_missing_token_reported_on_demand() {
        let config = load(&[]).unwrap();
        assert!(matches!(
            config.require_sheets(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_exclusion_rule_from_env() {
        let config = load(&[
            ("REPORT_EXCLUDED_EMAIL", "QA@Shop.Example"),
            ("REPORT_EXCLUDED_FIRST_NAME", "Test"),
            ("REPORT_EXCLUDED_LAST_NAME", "Account"),
        ])
        .unwrap();
        let rule = config.exclusion_rule();

        assert!(rule.is_excluded(&BillingDetails::new("A", "B", "qa@shop.example")));
        assert!(rule.is_excluded(&BillingDetails::new("test", "account", "x@y.example")));
        assert!(!rule.is_excluded(&BillingDetails::new("Test", "B", "x@y.example")));
    }

    #[test]
    fn test_half_configured_name_rejected() {
        let err = load(&[("REPORT_EXCLUDED_FIRST_NAME", "Test")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_malformed_excluded_email_rejected() {
        let err = load(&[("REPORT_EXCLUDED_EMAIL", "not-an-email")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
