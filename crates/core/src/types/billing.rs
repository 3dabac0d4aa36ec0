//! Recurring billing terms for subscriptions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Average number of weeks in a month, as used for monthly normalization.
const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(433, 0, 0, false, 2);
const DAYS_PER_MONTH: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Unit of a billing or trial period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Day,
    Week,
    Month,
    Year,
}

/// How often and how much a subscription bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSchedule {
    /// Billing period unit. `None` when the store did not record one.
    pub period: Option<BillingPeriod>,
    /// Number of period units between renewals (e.g. 3 for quarterly).
    pub interval: u32,
    /// Amount charged per renewal.
    pub total: Decimal,
}

impl BillingSchedule {
    /// Create a new billing schedule.
    #[must_use]
    pub const fn new(period: BillingPeriod, interval: u32, total: Decimal) -> Self {
        Self {
            period: Some(period),
            interval,
            total,
        }
    }

    /// The renewal price expressed per month.
    ///
    /// Days count as 1/30 of a month and weeks as 1/4.33. A missing period
    /// unit leaves the total unchanged, and an interval of zero is read as 1.
    #[must_use]
    pub fn monthly_equivalent(&self) -> Decimal {
        let interval = Decimal::from(self.interval.max(1));
        match self.period {
            Some(BillingPeriod::Day) => self.total * DAYS_PER_MONTH / interval,
            Some(BillingPeriod::Week) => self.total * WEEKS_PER_MONTH / interval,
            Some(BillingPeriod::Month) => self.total / interval,
            Some(BillingPeriod::Year) => self.total / interval / MONTHS_PER_YEAR,
            None => self.total,
        }
    }
}
