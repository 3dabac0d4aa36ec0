//! Deny-list filter for internal and test accounts.
//!
//! Every metric and every detail row goes through [`ExclusionRule::is_excluded`];
//! there is no query path that skips it.

use storemetrics_core::{BillingContact, Email};

/// A billing first/last name pair that marks a record as internal.
///
/// Both parts are stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelName {
    first: String,
    last: String,
}

impl SentinelName {
    /// Create a sentinel name. Returns `None` if either part is blank.
    #[must_use]
    pub fn new(first: &str, last: &str) -> Option<Self> {
        let first = first.trim().to_lowercase();
        let last = last.trim().to_lowercase();
        (!first.is_empty() && !last.is_empty()).then_some(Self { first, last })
    }

    fn matches(&self, first: &str, last: &str) -> bool {
        first.trim().to_lowercase() == self.first && last.trim().to_lowercase() == self.last
    }
}

/// Records whose billing email or billing name matches a sentinel are
/// left out of every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRule {
    emails: Vec<Email>,
    names: Vec<SentinelName>,
}

impl ExclusionRule {
    /// A rule that excludes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a sentinel billing email.
    #[must_use]
    pub fn with_email(mut self, email: Email) -> Self {
        self.emails.push(email);
        self
    }

    /// Add a sentinel billing name pair.
    #[must_use]
    pub fn with_name(mut self, name: SentinelName) -> Self {
        self.names.push(name);
        self
    }

    /// Whether the rule has no sentinels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.names.is_empty()
    }

    /// Whether `record` belongs to an excluded account.
    #[must_use]
    pub fn is_excluded<R: BillingContact + ?Sized>(&self, record: &R) -> bool {
        let billing = record.billing();
        self.emails.iter().any(|email| email.matches(&billing.email))
            || self
                .names
                .iter()
                .any(|name| name.matches(&billing.first_name, &billing.last_name))
    }

    /// Whether `record` should be counted.
    #[must_use]
    pub fn includes<R: BillingContact + ?Sized>(&self, record: &R) -> bool {
        !self.is_excluded(record)
    }
}
