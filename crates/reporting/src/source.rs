//! Order/subscription data source.
//!
//! The aggregator only talks to the store through [`OrderSource`]. The store
//! itself is external; [`MemoryStore`] is the bundled implementation used
//! for snapshot files and tests.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use storemetrics_core::{Order, OrderStatus, Subscription, SubscriptionId, SubscriptionStatus};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::window::DateWindow;

/// Errors raised by a data source.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The store cannot be reached or is not installed.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// A query was rejected or failed midway.
    #[error("query failed: {0}")]
    Query(String),

    /// A snapshot file could not be decoded.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Which timestamp a query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Created,
    Modified,
}

impl DateField {
    fn of_order(self, order: &Order) -> Option<NaiveDateTime> {
        match self {
            Self::Created => Some(order.date_created),
            Self::Modified => order.date_modified,
        }
    }

    fn of_subscription(self, subscription: &Subscription) -> Option<NaiveDateTime> {
        match self {
            Self::Created => Some(subscription.date_created),
            Self::Modified => subscription.date_modified,
        }
    }
}

/// Read-only query interface over the store.
///
/// Date filters are inclusive on both ends. Records without the requested
/// timestamp never match. An empty status slice matches every status.
/// Results come back ordered by the filtered timestamp, then by id.
pub trait OrderSource {
    /// Orders with one of `statuses` whose `field` timestamp is in `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    fn query_orders(
        &self,
        statuses: &[OrderStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DataSourceError>;

    /// Subscriptions with one of `statuses` whose `field` timestamp is in `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    fn query_subscriptions(
        &self,
        statuses: &[SubscriptionStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Subscription>, DataSourceError>;

    /// Look up one subscription by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unavailable or the query fails.
    fn subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, DataSourceError>;
}

impl<T: OrderSource + ?Sized> OrderSource for &T {
    fn query_orders(
        &self,
        statuses: &[OrderStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DataSourceError> {
        (**self).query_orders(statuses, field, window)
    }

    fn query_subscriptions(
        &self,
        statuses: &[SubscriptionStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Subscription>, DataSourceError> {
        (**self).query_subscriptions(statuses, field, window)
    }

    fn subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, DataSourceError> {
        (**self).subscription(id)
    }
}

/// On-disk layout of a store snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// In-memory store holding a fixed set of records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    orders: Vec<Order>,
    subscriptions: Vec<Subscription>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order.
    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Add a subscription.
    #[must_use]
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Number of orders and subscriptions held.
    #[must_use]
    pub fn len(&self) -> (usize, usize) {
        (self.orders.len(), self.subscriptions.len())
    }

    /// Whether the store holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.subscriptions.is_empty()
    }

    /// Load a snapshot from a JSON or YAML file (chosen by extension).
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the file cannot be read and
    /// `InvalidSnapshot` if it cannot be decoded.
    #[instrument(fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self, DataSourceError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DataSourceError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let snapshot: Snapshot = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| DataSourceError::InvalidSnapshot(e.to_string()))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| DataSourceError::InvalidSnapshot(e.to_string()))?
        };

        debug!(
            orders = snapshot.orders.len(),
            subscriptions = snapshot.subscriptions.len(),
            "Loaded store snapshot"
        );

        Ok(Self::from(snapshot))
    }
}

impl From<Snapshot> for MemoryStore {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            orders: snapshot.orders,
            subscriptions: snapshot.subscriptions,
        }
    }
}

impl OrderSource for MemoryStore {
    fn query_orders(
        &self,
        statuses: &[OrderStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Order>, DataSourceError> {
        let mut matched: Vec<(NaiveDateTime, &Order)> = self
            .orders
            .iter()
            .filter(|order| statuses.is_empty() || statuses.contains(&order.status))
            .filter_map(|order| {
                field
                    .of_order(order)
                    .filter(|ts| window.contains(*ts))
                    .map(|ts| (ts, order))
            })
            .collect();
        matched.sort_by_key(|(ts, order)| (*ts, order.id));
        Ok(matched.into_iter().map(|(_, order)| order.clone()).collect())
    }

    fn query_subscriptions(
        &self,
        statuses: &[SubscriptionStatus],
        field: DateField,
        window: &DateWindow,
    ) -> Result<Vec<Subscription>, DataSourceError> {
        let mut matched: Vec<(NaiveDateTime, &Subscription)> = self
            .subscriptions
            .iter()
            .filter(|sub| statuses.is_empty() || statuses.contains(&sub.status))
            .filter_map(|sub| {
                field
                    .of_subscription(sub)
                    .filter(|ts| window.contains(*ts))
                    .map(|ts| (ts, sub))
            })
            .collect();
        matched.sort_by_key(|(ts, sub)| (*ts, sub.id));
        Ok(matched.into_iter().map(|(_, sub)| sub.clone()).collect())
    }

    fn subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>, DataSourceError> {
        Ok(self.subscriptions.iter().find(|sub| sub.id == id).cloned())
    }
}
