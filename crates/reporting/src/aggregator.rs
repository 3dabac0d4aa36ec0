//! Report aggregation.
//!
//! Resolves the window, issues fresh queries against the source and computes
//! every metric and detail row. Nothing is cached between calls.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use storemetrics_core::{OrderId, OrderStatus, Period, SubscriptionId, SubscriptionStatus};
use tracing::{debug, instrument};

use crate::details;
use crate::exclusion::ExclusionRule;
use crate::metrics::{self, LinkedSubscriptions, SALE_STATUSES};
use crate::report::ReportResult;
use crate::source::{DataSourceError, DateField, OrderSource};
use crate::window::{DateWindow, resolve_window};

/// Computes [`ReportResult`]s from an [`OrderSource`].
#[derive(Debug, Clone)]
pub struct Aggregator<S> {
    source: S,
    rule: ExclusionRule,
}

impl<S: OrderSource> Aggregator<S> {
    /// Create an aggregator over `source`, dropping records matched by `rule`.
    pub const fn new(source: S, rule: ExclusionRule) -> Self {
        Self { source, rule }
    }

    /// Aggregate the report for `period` on `reference_date`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the data source; no partial result
    /// is produced.
    #[instrument(skip(self, period), fields(period = %period))]
    pub fn aggregate(
        &self,
        period: Period,
        reference_date: NaiveDate,
    ) -> Result<ReportResult, DataSourceError> {
        let window = resolve_window(period, reference_date);
        let rule = &self.rule;

        let sales = self
            .source
            .query_orders(&SALE_STATUSES, DateField::Created, &window)?;
        let refunded =
            self.source
                .query_orders(&[OrderStatus::Refunded], DateField::Modified, &window)?;
        let created = self
            .source
            .query_subscriptions(&[], DateField::Created, &window)?;
        // A subscription cancelled in the window was created no later than
        // its end; the cancellation timestamp itself is checked in memory.
        let cancelled = self.source.query_subscriptions(
            &[SubscriptionStatus::Cancelled],
            DateField::Created,
            &DateWindow::ending_at(window.end()),
        )?;

        let linked_ids: BTreeSet<SubscriptionId> = metrics::sales(&sales, &window, rule)
            .chain(metrics::refunded(&refunded, &window, rule))
            .flat_map(|order| order.subscription_ids.iter().copied())
            .collect();
        let mut linked = Vec::with_capacity(linked_ids.len());
        for id in linked_ids {
            if let Some(subscription) = self.source.subscription(id)? {
                linked.push(subscription);
            }
        }
        let links = LinkedSubscriptions::new(linked, rule);

        debug!(
            sales = sales.len(),
            refunded = refunded.len(),
            subscriptions = created.len(),
            cancelled = cancelled.len(),
            "Fetched report inputs"
        );

        let gross_revenue = metrics::gross_revenue(&sales, &window, rule);
        let discounts_given = metrics::discounts_given(&sales, &window, rule);
        let refunds = metrics::refunds(&refunded, &window, rule);
        let trials_started = metrics::trials_started(&created, &window, rule);
        let new_members = metrics::new_members(&created, &window, rule);
        let cancellations = metrics::cancellations(&cancelled, &window, rule);

        let orders_in_window = metrics::sales(&sales, &window, rule)
            .chain(metrics::refunded(&refunded, &window, rule))
            .map(|order| order.id)
            .collect::<BTreeSet<OrderId>>()
            .len();
        let subscriptions_in_window = metrics::created_in_window(&created, &window, rule)
            .chain(metrics::cancelled_in_window(&cancelled, &window, rule))
            .map(|sub| sub.id)
            .collect::<BTreeSet<SubscriptionId>>()
            .len();

        Ok(ReportResult {
            period,
            reference_date,
            window,
            net_revenue: metrics::net_revenue(gross_revenue, discounts_given, refunds),
            gross_revenue,
            discounts_given,
            refunds,
            trials_started,
            new_members,
            cancellations,
            net_paid_subscriber_growth: metrics::net_paid_subscriber_growth(
                new_members,
                cancellations,
            ),
            rolling_ltv: metrics::rolling_ltv(&created, &window, rule),
            trial_order_percentage: metrics::trial_order_percentage(
                &sales, &window, rule, &links,
            ),
            detailed_orders: details::order_rows(&sales, &refunded, &window, rule, &links),
            detailed_cancellations: details::cancellation_rows(&cancelled, &window, rule),
            orders_in_window,
            subscriptions_in_window,
        })
    }
}
