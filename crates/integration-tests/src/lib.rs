//! Integration tests for store metrics reporting.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storemetrics-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `export` - Exporter end-to-end against an in-memory store
//! - `scenarios` - Metric properties over realistic store contents
//! - `snapshot` - Loading JSON/YAML store snapshots
//!
//! This library holds the shared fixtures: record builders and a sheet
//! writer that records calls instead of sending them.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used)]

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use storemetrics_core::{
    BillingDetails, BillingPeriod, BillingSchedule, CustomerId, LineItem, Order, OrderId,
    OrderStatus, Subscription, SubscriptionId, SubscriptionStatus,
};
use storemetrics_reporting::{PeriodSchedule, ReportingConfig, SheetWriter, SheetsError};

/// Parse a decimal literal.
#[must_use]
pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// Calendar date.
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Store-local timestamp.
#[must_use]
pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).expect("valid time")
}

/// Billing details of a regular customer.
#[must_use]
pub fn customer(n: i64) -> BillingDetails {
    BillingDetails::new(
        format!("Customer{n}"),
        "Example",
        format!("customer{n}@example.com"),
    )
}

/// Billing details of the internal test account.
#[must_use]
pub fn internal_account() -> BillingDetails {
    BillingDetails::new("Test", "Account", "qa@shop.example")
}

/// Builder for [`Order`] fixtures.
#[derive(Debug, Clone)]
pub struct OrderBuilder(Order);

impl OrderBuilder {
    /// A completed order with the given subtotal and no discount.
    #[must_use]
    pub fn new(id: i64, created: NaiveDateTime, subtotal: &str) -> Self {
        Self(Order {
            id: OrderId::new(id),
            status: OrderStatus::Completed,
            date_created: created,
            date_modified: None,
            billing: customer(id),
            subtotal: dec(subtotal),
            total: dec(subtotal),
            total_discount: Decimal::ZERO,
            total_refunded: Decimal::ZERO,
            line_items: vec![LineItem::new(None, "Coffee Subscription")],
            subscription_ids: Vec::new(),
        })
    }

    #[must_use]
    pub const fn status(mut self, status: OrderStatus) -> Self {
        self.0.status = status;
        self
    }

    #[must_use]
    pub fn discount(mut self, amount: &str) -> Self {
        self.0.total_discount = dec(amount);
        self
    }

    /// Mark the order refunded at `when` for `amount`.
    #[must_use]
    pub fn refunded(mut self, amount: &str, when: NaiveDateTime) -> Self {
        self.0.status = OrderStatus::Refunded;
        self.0.total_refunded = dec(amount);
        self.0.date_modified = Some(when);
        self
    }

    #[must_use]
    pub fn billing(mut self, billing: BillingDetails) -> Self {
        self.0.billing = billing;
        self
    }

    #[must_use]
    pub fn subscription(mut self, id: i64) -> Self {
        self.0.subscription_ids.push(SubscriptionId::new(id));
        self
    }

    #[must_use]
    pub fn build(self) -> Order {
        self.0
    }
}

/// Builder for [`Subscription`] fixtures.
#[derive(Debug, Clone)]
pub struct SubscriptionBuilder(Subscription);

impl SubscriptionBuilder {
    /// An active monthly subscription for customer `id` with the given price.
    #[must_use]
    pub fn new(id: i64, created: NaiveDateTime, monthly_total: &str) -> Self {
        Self(Subscription {
            id: SubscriptionId::new(id),
            status: SubscriptionStatus::Active,
            customer_id: CustomerId::new(id),
            date_created: created,
            date_modified: None,
            date_cancelled: None,
            billing: customer(id),
            schedule: BillingSchedule::new(BillingPeriod::Month, 1, dec(monthly_total)),
            line_items: vec![LineItem::new(None, "Coffee Subscription")],
            cancellation_reason: None,
        })
    }

    #[must_use]
    pub const fn customer(mut self, id: i64) -> Self {
        self.0.customer_id = CustomerId::new(id);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: SubscriptionStatus) -> Self {
        self.0.status = status;
        self
    }

    #[must_use]
    pub fn schedule(mut self, period: BillingPeriod, interval: u32, total: &str) -> Self {
        self.0.schedule = BillingSchedule::new(period, interval, dec(total));
        self
    }

    /// Give the subscription a 14-day free trial.
    #[must_use]
    pub fn trial(mut self) -> Self {
        self.0.line_items =
            vec![LineItem::new(None, "Coffee Trial").with_trial(14, BillingPeriod::Day)];
        self
    }

    /// Cancel with an explicit cancellation timestamp.
    #[must_use]
    pub fn cancelled(mut self, when: NaiveDateTime) -> Self {
        self.0.status = SubscriptionStatus::Cancelled;
        self.0.date_cancelled = Some(when);
        self.0.date_modified = Some(when);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: &str) -> Self {
        self.0.cancellation_reason = Some(reason.to_string());
        self
    }

    #[must_use]
    pub fn billing(mut self, billing: BillingDetails) -> Self {
        self.0.billing = billing;
        self
    }

    #[must_use]
    pub fn build(self) -> Subscription {
        self.0
    }
}

/// Configuration with every period enabled and pointing at `spreadsheet_id`,
/// excluding [`internal_account`].
#[must_use]
pub fn test_config(spreadsheet_id: &str) -> ReportingConfig {
    let schedule = PeriodSchedule {
        enabled: true,
        spreadsheet_id: Some(spreadsheet_id.to_string()),
    };
    ReportingConfig::from_lookup(|key| match key {
        "REPORT_EXCLUDED_EMAIL" => Some("qa@shop.example".to_string()),
        "REPORT_EXCLUDED_FIRST_NAME" => Some("Test".to_string()),
        "REPORT_EXCLUDED_LAST_NAME" => Some("Account".to_string()),
        _ => None,
    })
    .map(|config| ReportingConfig {
        daily: schedule.clone(),
        weekly: schedule.clone(),
        monthly: schedule,
        ..config
    })
    .expect("valid test configuration")
}

/// A call received by [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterCall {
    CreateSheet {
        spreadsheet_id: String,
        sheet_name: String,
    },
    WriteGrid {
        spreadsheet_id: String,
        sheet_name: String,
        top_left: String,
        grid: Vec<Vec<String>>,
    },
}

/// Sheet writer that records every call and optionally fails.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    calls: Mutex<Vec<WriterCall>>,
    fail_create: bool,
}

impl RecordingWriter {
    /// A writer whose `create_sheet` always fails with a transport error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<WriterCall> {
        self.calls.lock().expect("writer lock").clone()
    }

    fn record(&self, call: WriterCall) {
        self.calls.lock().expect("writer lock").push(call);
    }
}

impl SheetWriter for RecordingWriter {
    async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<(), SheetsError> {
        self.record(WriterCall::CreateSheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
        });
        if self.fail_create {
            return Err(SheetsError::Request("connection reset".to_string()));
        }
        Ok(())
    }

    async fn write_grid(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        grid: &[Vec<String>],
        top_left: &str,
    ) -> Result<(), SheetsError> {
        self.record(WriterCall::WriteGrid {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            top_left: top_left.to_string(),
            grid: grid.to_vec(),
        });
        Ok(())
    }

    async fn spreadsheet_title(&self, _spreadsheet_id: &str) -> Result<String, SheetsError> {
        Ok("Store Metrics".to_string())
    }
}
