//! Subscription records as read from the store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::billing::BillingSchedule;
use super::contact::{BillingContact, BillingDetails};
use super::id::{CustomerId, SubscriptionId};
use super::order::LineItem;
use super::status::SubscriptionStatus;

/// A recurring subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub status: SubscriptionStatus,
    pub customer_id: CustomerId,
    pub date_created: NaiveDateTime,
    #[serde(default)]
    pub date_modified: Option<NaiveDateTime>,
    /// When the cancellation happened. Older records leave this empty even
    /// when cancelled.
    #[serde(default)]
    pub date_cancelled: Option<NaiveDateTime>,
    #[serde(default)]
    pub billing: BillingDetails,
    pub schedule: BillingSchedule,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

impl Subscription {
    /// Whether any product on the subscription grants a free trial.
    #[must_use]
    pub fn has_trial(&self) -> bool {
        self.line_items.iter().any(LineItem::grants_trial)
    }

    /// Cancellation timestamp, falling back to the last modification.
    #[must_use]
    pub fn effective_cancellation(&self) -> Option<NaiveDateTime> {
        self.date_cancelled.or(self.date_modified)
    }
}

impl BillingContact for Subscription {
    fn billing(&self) -> &BillingDetails {
        &self.billing
    }
}
