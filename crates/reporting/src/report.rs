//! Aggregated report values.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use storemetrics_core::Period;

use crate::window::DateWindow;

/// Suffix appended to the order id of a refund-derived detail row.
pub const REFUND_SUFFIX: &str = " (REFUND)";

/// Cancellation reason used when the subscription records none.
pub const REASON_NOT_SPECIFIED: &str = "Not specified";

/// One line of the order detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetailRow {
    /// Order id; refund rows carry [`REFUND_SUFFIX`].
    pub order_id: String,
    pub date: NaiveDateTime,
    pub customer_name: String,
    pub customer_email: String,
    pub gross_revenue: Decimal,
    pub net_revenue: Decimal,
    pub discounts: Decimal,
    pub refunds: Decimal,
    pub is_trial: bool,
    pub is_new_member: bool,
    pub products: String,
}

/// One line of the cancellation detail section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationDetailRow {
    pub subscription_id: String,
    pub date_cancelled: NaiveDateTime,
    pub customer_name: String,
    pub customer_email: String,
    pub subscription_value: Decimal,
    pub cancellation_reason: String,
    pub days_active: i64,
    pub products: String,
}

/// Metrics and detail rows for one period and reference date.
///
/// Built once per aggregation and consumed by the formatter; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
    pub period: Period,
    pub reference_date: NaiveDate,
    pub window: DateWindow,
    pub net_revenue: Decimal,
    pub gross_revenue: Decimal,
    pub discounts_given: Decimal,
    pub refunds: Decimal,
    pub trials_started: i64,
    pub new_members: i64,
    pub cancellations: i64,
    pub net_paid_subscriber_growth: i64,
    pub rolling_ltv: Decimal,
    pub trial_order_percentage: Decimal,
    pub detailed_orders: Vec<OrderDetailRow>,
    pub detailed_cancellations: Vec<CancellationDetailRow>,
    /// Distinct non-excluded orders sold or refunded in the window
    pub orders_in_window: usize,
    /// Distinct non-excluded subscriptions created or cancelled in the window
    pub subscriptions_in_window: usize,
}

impl ReportResult {
    /// A report with every metric zero and no detail rows.
    #[must_use]
    pub const fn empty(period: Period, reference_date: NaiveDate, window: DateWindow) -> Self {
        Self {
            period,
            reference_date,
            window,
            net_revenue: Decimal::ZERO,
            gross_revenue: Decimal::ZERO,
            discounts_given: Decimal::ZERO,
            refunds: Decimal::ZERO,
            trials_started: 0,
            new_members: 0,
            cancellations: 0,
            net_paid_subscriber_growth: 0,
            rolling_ltv: Decimal::ZERO,
            trial_order_percentage: Decimal::ZERO,
            detailed_orders: Vec::new(),
            detailed_cancellations: Vec::new(),
            orders_in_window: 0,
            subscriptions_in_window: 0,
        }
    }

    /// Whether no order and no subscription qualified in the window.
    ///
    /// An empty report is exported as a no-op: no sheet is created.
    #[must_use]
    pub const fn has_no_data(&self) -> bool {
        self.orders_in_window == 0 && self.subscriptions_in_window == 0
    }
}
