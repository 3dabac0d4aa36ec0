//! Status enums for store records.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} status: {value}")]
pub struct ParseStatusError {
    /// Which status family was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Order status.
///
/// Only the four statuses the reports care about are modelled; anything else
/// the store reports (pending payment, failed, draft, ...) collapses into
/// [`OrderStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Completed,
    Processing,
    OnHold,
    Refunded,
    #[default]
    Other,
}

impl OrderStatus {
    /// The slug used by the store, without the `wc-` prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Refunded => "refunded",
            Self::Other => "other",
        }
    }

    /// Parse a store slug. Unknown slugs map to [`OrderStatus::Other`].
    #[must_use]
    pub fn from_slug(s: &str) -> Self {
        match strip_store_prefix(s) {
            "completed" => Self::Completed,
            "processing" => Self::Processing,
            "on-hold" => Self::OnHold,
            "refunded" => Self::Refunded,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        Self::from_slug(&s)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Pending,
    OnHold,
    PendingCancel,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    /// The slug used by the store, without the `wc-` prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::OnHold => "on-hold",
            Self::PendingCancel => "pending-cancel",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match strip_store_prefix(s) {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "on-hold" => Ok(Self::OnHold),
            "pending-cancel" => Ok(Self::PendingCancel),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseStatusError {
                kind: "subscription",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SubscriptionStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        status.as_str().to_string()
    }
}

fn strip_store_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("wc-").unwrap_or(s)
}
