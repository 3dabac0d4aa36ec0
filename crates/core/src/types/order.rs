//! Order records as read from the store.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::billing::BillingPeriod;
use super::contact::{BillingContact, BillingDetails};
use super::id::{OrderId, ProductId, SubscriptionId};
use super::status::OrderStatus;

/// A product line on an order or subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the line refers to, if it still exists.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Product name as shown to the customer.
    pub name: String,
    /// Free trial length configured on the product (0 = no trial).
    #[serde(default)]
    pub trial_length: u32,
    /// Unit of `trial_length`.
    #[serde(default)]
    pub trial_period: Option<BillingPeriod>,
}

impl LineItem {
    /// Create a line item without trial terms.
    #[must_use]
    pub fn new(product_id: Option<ProductId>, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            trial_length: 0,
            trial_period: None,
        }
    }

    /// Attach trial terms to the line item.
    #[must_use]
    pub const fn with_trial(mut self, length: u32, period: BillingPeriod) -> Self {
        self.trial_length = length;
        self.trial_period = Some(period);
        self
    }

    /// Whether the product grants a free trial.
    #[must_use]
    pub const fn grants_trial(&self) -> bool {
        self.trial_length > 0
    }
}

/// Join line item names with `", "` in their original order.
#[must_use]
pub fn product_names(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| item.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A store order.
///
/// Amounts exclude shipping and tax except `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub date_created: NaiveDateTime,
    #[serde(default)]
    pub date_modified: Option<NaiveDateTime>,
    #[serde(default)]
    pub billing: BillingDetails,
    /// Sum of line totals before discounts, excluding shipping and tax.
    pub subtotal: Decimal,
    /// Amount charged, including shipping and tax.
    pub total: Decimal,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub total_refunded: Decimal,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Subscriptions created by this order.
    #[serde(default)]
    pub subscription_ids: Vec<SubscriptionId>,
}

impl Order {
    /// Timestamp of the last change, falling back to creation.
    #[must_use]
    pub fn modified_or_created(&self) -> NaiveDateTime {
        self.date_modified.unwrap_or(self.date_created)
    }
}

impl BillingContact for Order {
    fn billing(&self) -> &BillingDetails {
        &self.billing
    }
}
