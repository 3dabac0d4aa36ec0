//! Billing contact details shared by orders and subscriptions.

use serde::{Deserialize, Serialize};

/// Name and email from a record's billing address.
///
/// All fields are free text as entered at checkout and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl BillingDetails {
    /// Create billing details.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// First and last name joined by a space, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A record that carries billing contact details.
pub trait BillingContact {
    /// The billing details of this record.
    fn billing(&self) -> &BillingDetails;
}

impl BillingContact for BillingDetails {
    fn billing(&self) -> &BillingDetails {
        self
    }
}
