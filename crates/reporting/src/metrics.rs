//! Metric definitions.
//!
//! Each metric is a pure function over records already fetched for a window.
//! Every function re-checks its own eligibility rules (status, timestamp,
//! exclusion) so the result does not depend on how loosely the store
//! filtered.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::{Decimal, RoundingStrategy};
use storemetrics_core::{
    CustomerId, Order, OrderStatus, Subscription, SubscriptionId, SubscriptionStatus,
};

use crate::exclusion::ExclusionRule;
use crate::window::DateWindow;

/// Order statuses that count as a sale for gross revenue and discounts.
pub const SALE_STATUSES: [OrderStatus; 4] = [
    OrderStatus::Completed,
    OrderStatus::Processing,
    OrderStatus::OnHold,
    OrderStatus::Refunded,
];

/// Subscription statuses considered for rolling LTV.
pub const LTV_STATUSES: [SubscriptionStatus; 3] = [
    SubscriptionStatus::Active,
    SubscriptionStatus::Cancelled,
    SubscriptionStatus::Expired,
];

/// Sum of subtotals over sale orders created in the window.
#[must_use]
pub fn gross_revenue(orders: &[Order], window: &DateWindow, rule: &ExclusionRule) -> Decimal {
    sales(orders, window, rule).map(|order| order.subtotal).sum()
}

/// Sum of discounts over the same orders as [`gross_revenue`].
#[must_use]
pub fn discounts_given(orders: &[Order], window: &DateWindow, rule: &ExclusionRule) -> Decimal {
    sales(orders, window, rule)
        .map(|order| order.total_discount)
        .sum()
}

/// Sum of refunded amounts over refunded orders modified in the window.
///
/// Refunds belong to the period the refund happened in, not the period of
/// the original sale.
#[must_use]
pub fn refunds(orders: &[Order], window: &DateWindow, rule: &ExclusionRule) -> Decimal {
    refunded(orders, window, rule)
        .map(|order| order.total_refunded)
        .sum()
}

/// Net revenue as gross minus discounts minus refunds.
#[must_use]
pub fn net_revenue(gross: Decimal, discounts: Decimal, refunds: Decimal) -> Decimal {
    gross - discounts - refunds
}

/// Sale orders created in the window, exclusion applied.
pub fn sales<'a>(
    orders: &'a [Order],
    window: &'a DateWindow,
    rule: &'a ExclusionRule,
) -> impl Iterator<Item = &'a Order> + 'a {
    orders.iter().filter(move |order| {
        SALE_STATUSES.contains(&order.status)
            && window.contains(order.date_created)
            && rule.includes(*order)
    })
}

/// Refunded orders modified in the window, exclusion applied.
pub fn refunded<'a>(
    orders: &'a [Order],
    window: &'a DateWindow,
    rule: &'a ExclusionRule,
) -> impl Iterator<Item = &'a Order> + 'a {
    orders.iter().filter(move |order| {
        order.status == OrderStatus::Refunded
            && order.date_modified.is_some_and(|ts| window.contains(ts))
            && rule.includes(*order)
    })
}

/// Subscriptions (any status) created in the window, exclusion applied.
pub fn created_in_window<'a>(
    subscriptions: &'a [Subscription],
    window: &'a DateWindow,
    rule: &'a ExclusionRule,
) -> impl Iterator<Item = &'a Subscription> + 'a {
    subscriptions
        .iter()
        .filter(move |sub| window.contains(sub.date_created) && rule.includes(*sub))
}

/// Whether a subscription started with a free trial.
///
/// This is the only trial test used anywhere in the reports.
#[must_use]
pub fn has_trial(subscription: &Subscription) -> bool {
    subscription.has_trial()
}

/// An active, paying subscription that never had a trial.
#[must_use]
pub fn is_paid_member(subscription: &Subscription) -> bool {
    !has_trial(subscription)
        && subscription.status == SubscriptionStatus::Active
        && subscription.schedule.total > Decimal::ZERO
}

/// Trial subscriptions (any status) created in the window.
#[must_use]
pub fn trials_started(
    subscriptions: &[Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> i64 {
    count(created_in_window(subscriptions, window, rule).filter(|sub| has_trial(sub)))
}

/// Paid, non-trial subscriptions created in the window that are active.
#[must_use]
pub fn new_members(
    subscriptions: &[Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> i64 {
    count(created_in_window(subscriptions, window, rule).filter(|sub| is_paid_member(sub)))
}

/// Non-trial subscriptions cancelled within the window.
///
/// The cancellation time is the cancellation timestamp when recorded and
/// the last modification otherwise. Ordered by that time, then id.
#[must_use]
pub fn cancelled_in_window<'a>(
    subscriptions: &'a [Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> Vec<&'a Subscription> {
    let mut cancelled: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|sub| {
            sub.status == SubscriptionStatus::Cancelled
                && !has_trial(sub)
                && sub
                    .effective_cancellation()
                    .is_some_and(|ts| window.contains(ts))
                && rule.includes(*sub)
        })
        .collect();
    cancelled.sort_by_key(|sub| (sub.effective_cancellation(), sub.id));
    cancelled
}

/// Number of cancellations, see [`cancelled_in_window`].
#[must_use]
pub fn cancellations(
    subscriptions: &[Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> i64 {
    count(cancelled_in_window(subscriptions, window, rule).into_iter())
}

/// New members minus cancellations.
#[must_use]
pub const fn net_paid_subscriber_growth(new_members: i64, cancellations: i64) -> i64 {
    new_members - cancellations
}

/// Average monthly-equivalent revenue per distinct customer.
///
/// Considers active, cancelled and expired subscriptions created in the
/// window. A customer's subscriptions are summed, not averaged, before
/// dividing by the number of customers. Zero when nothing qualifies.
#[must_use]
pub fn rolling_ltv(
    subscriptions: &[Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> Decimal {
    let mut per_customer: BTreeMap<CustomerId, Decimal> = BTreeMap::new();
    for sub in created_in_window(subscriptions, window, rule)
        .filter(|sub| LTV_STATUSES.contains(&sub.status))
    {
        *per_customer.entry(sub.customer_id).or_default() += sub.schedule.monthly_equivalent();
    }

    if per_customer.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = per_customer.values().copied().sum();
    total / Decimal::from(per_customer.len())
}

/// Subscriptions linked from orders, keyed by id.
///
/// Only subscriptions that pass the exclusion rule are kept, so an excluded
/// subscription never marks an order as trial or new-member.
#[derive(Debug, Clone, Default)]
pub struct LinkedSubscriptions {
    by_id: HashMap<SubscriptionId, Subscription>,
}

impl LinkedSubscriptions {
    /// Build the lookup from resolved subscriptions.
    #[must_use]
    pub fn new(
        subscriptions: impl IntoIterator<Item = Subscription>,
        rule: &ExclusionRule,
    ) -> Self {
        let by_id = subscriptions
            .into_iter()
            .filter(|sub| rule.includes(sub))
            .map(|sub| (sub.id, sub))
            .collect();
        Self { by_id }
    }

    fn linked<'a>(&'a self, order: &'a Order) -> impl Iterator<Item = &'a Subscription> + 'a {
        order
            .subscription_ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
    }

    /// Whether any subscription created by `order` has a trial.
    #[must_use]
    pub fn order_has_trial(&self, order: &Order) -> bool {
        self.linked(order).any(has_trial)
    }

    /// Whether any subscription created by `order` is a paid membership.
    #[must_use]
    pub fn order_is_new_member(&self, order: &Order) -> bool {
        self.linked(order).any(is_paid_member)
    }
}

/// Share of sale orders in the window whose subscription has a trial,
/// as a percentage rounded to two decimals. Zero when there are no orders.
#[must_use]
pub fn trial_order_percentage(
    orders: &[Order],
    window: &DateWindow,
    rule: &ExclusionRule,
    links: &LinkedSubscriptions,
) -> Decimal {
    let (total, trials) =
        sales(orders, window, rule).fold((0_u64, 0_u64), |(total, trials), order| {
            (total + 1, trials + u64::from(links.order_has_trial(order)))
        });

    if total == 0 {
        return Decimal::ZERO;
    }

    (Decimal::from(trials) * Decimal::ONE_HUNDRED / Decimal::from(total))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn count<T>(items: impl Iterator<Item = T>) -> i64 {
    i64::try_from(items.count()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use storemetrics_core::{
        BillingDetails, BillingPeriod, BillingSchedule, Email, LineItem, OrderId,
    };

    use super::*;
    use crate::exclusion::SentinelName;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn jan(day: u32) -> DateWindow {
        let d = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        DateWindow::days(d, d).unwrap()
    }

    fn order(id: i64, status: OrderStatus, subtotal: &str, discount: &str) -> Order {
        Order {
            id: OrderId::new(id),
            status,
            date_created: ts(1, 10),
            date_modified: None,
            billing: BillingDetails::new("Jane", "Doe", "jane@example.com"),
            subtotal: dec(subtotal),
            total: dec(subtotal),
            total_discount: dec(discount),
            total_refunded: Decimal::ZERO,
            line_items: vec![LineItem::new(None, "Box")],
            subscription_ids: Vec::new(),
        }
    }

    fn sub(id: i64, customer: i64, status: SubscriptionStatus, total: &str) -> Subscription {
        Subscription {
            id: SubscriptionId::new(id),
            status,
            customer_id: CustomerId::new(customer),
            date_created: ts(1, 9),
            date_modified: None,
            date_cancelled: None,
            billing: BillingDetails::new("Jane", "Doe", "jane@example.com"),
            schedule: BillingSchedule::new(BillingPeriod::Month, 1, dec(total)),
            line_items: vec![LineItem::new(None, "Box")],
            cancellation_reason: None,
        }
    }

    fn trial(mut subscription: Subscription) -> Subscription {
        subscription.line_items =
            vec![LineItem::new(None, "Trial Box").with_trial(14, BillingPeriod::Day)];
        subscription
    }

    fn internal() -> ExclusionRule {
        ExclusionRule::none()
            .with_email(Email::parse("qa@shop.example").unwrap())
            .with_name(SentinelName::new("Test", "Account").unwrap())
    }

    #[test]
    fn test_single_completed_order_revenue() {
        let orders = vec![order(1, OrderStatus::Completed, "100", "10")];
        let rule = ExclusionRule::none();
        let window = jan(1);

        let gross = gross_revenue(&orders, &window, &rule);
        let discounts = discounts_given(&orders, &window, &rule);
        let refunded = refunds(&orders, &window, &rule);

        assert_eq!(gross, dec("100"));
        assert_eq!(discounts, dec("10"));
        assert_eq!(refunded, Decimal::ZERO);
        assert_eq!(net_revenue(gross, discounts, refunded), dec("90"));
    }

    #[test]
    fn test_refunded_order_counts_as_gross_sale() {
        let mut refunded_order = order(2, OrderStatus::Refunded, "50", "0");
        refunded_order.total_refunded = dec("50");
        refunded_order.date_modified = Some(ts(3, 12));
        let orders = vec![refunded_order, order(3, OrderStatus::Other, "70", "0")];
        let rule = ExclusionRule::none();

        assert_eq!(gross_revenue(&orders, &jan(1), &rule), dec("50"));
        // Refund attributed to the day it happened.
        assert_eq!(refunds(&orders, &jan(1), &rule), Decimal::ZERO);
        assert_eq!(refunds(&orders, &jan(3), &rule), dec("50"));
    }

    #[test]
    fn test_excluded_orders_contribute_nothing() {
        let mut by_email = order(1, OrderStatus::Completed, "100", "5");
        by_email.billing.email = "QA@shop.example".to_string();
        let mut by_name = order(2, OrderStatus::Refunded, "40", "0");
        by_name.billing = BillingDetails::new("test", "account", "other@example.com");
        by_name.date_modified = Some(ts(1, 20));
        by_name.total_refunded = dec("40");
        let orders = vec![by_email, by_name];
        let rule = internal();

        assert_eq!(gross_revenue(&orders, &jan(1), &rule), Decimal::ZERO);
        assert_eq!(discounts_given(&orders, &jan(1), &rule), Decimal::ZERO);
        assert_eq!(refunds(&orders, &jan(1), &rule), Decimal::ZERO);
    }

    #[test]
    fn test_trials_and_new_members() {
        let subs = vec![
            trial(sub(1, 1, SubscriptionStatus::Active, "20")),
            trial(sub(2, 2, SubscriptionStatus::Cancelled, "20")),
            sub(3, 3, SubscriptionStatus::Active, "20"),
            sub(4, 4, SubscriptionStatus::Active, "0"),
            sub(5, 5, SubscriptionStatus::Pending, "20"),
        ];
        let rule = ExclusionRule::none();

        assert_eq!(trials_started(&subs, &jan(1), &rule), 2);
        assert_eq!(new_members(&subs, &jan(1), &rule), 1);
        assert_eq!(trials_started(&subs, &jan(2), &rule), 0);
    }

    #[test]
    fn test_cancellations_use_effective_timestamp() {
        let mut explicit = sub(1, 1, SubscriptionStatus::Cancelled, "20");
        explicit.date_cancelled = Some(ts(2, 8));
        explicit.date_modified = Some(ts(4, 8));

        let mut fallback = sub(2, 2, SubscriptionStatus::Cancelled, "20");
        fallback.date_modified = Some(ts(2, 6));

        let mut trial_cancel = trial(sub(3, 3, SubscriptionStatus::Cancelled, "20"));
        trial_cancel.date_cancelled = Some(ts(2, 9));

        let mut expired = sub(4, 4, SubscriptionStatus::Expired, "20");
        expired.date_modified = Some(ts(2, 9));

        let subs = vec![explicit, fallback, trial_cancel, expired];
        let rule = ExclusionRule::none();

        let cancelled = cancelled_in_window(&subs, &jan(2), &rule);
        let ids: Vec<_> = cancelled.iter().map(|s| s.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(cancellations(&subs, &jan(4), &rule), 0);
    }

    #[test]
    fn test_net_paid_growth_identity() {
        assert_eq!(net_paid_subscriber_growth(3, 5), -2);
        assert_eq!(net_paid_subscriber_growth(4, 1), 3);
    }

    #[test]
    fn test_rolling_ltv_sums_per_customer() {
        let subs = vec![
            sub(1, 7, SubscriptionStatus::Active, "10"),
            sub(2, 7, SubscriptionStatus::Cancelled, "10"),
        ];
        assert_eq!(
            rolling_ltv(&subs, &jan(1), &ExclusionRule::none()),
            dec("20")
        );
    }

    #[test]
    fn test_rolling_ltv_averages_across_customers() {
        let subs = vec![
            sub(1, 1, SubscriptionStatus::Active, "10"),
            sub(2, 1, SubscriptionStatus::Expired, "10"),
            sub(3, 2, SubscriptionStatus::Active, "40"),
            // Not counted: wrong status.
            sub(4, 3, SubscriptionStatus::OnHold, "1000"),
        ];
        assert_eq!(
            rolling_ltv(&subs, &jan(1), &ExclusionRule::none()),
            dec("30")
        );
    }

    #[test]
    fn test_rolling_ltv_empty_is_zero() {
        assert_eq!(
            rolling_ltv(&[], &jan(1), &ExclusionRule::none()),
            Decimal::ZERO
        );
        let outside = vec![sub(1, 1, SubscriptionStatus::Active, "10")];
        assert_eq!(
            rolling_ltv(&outside, &jan(5), &ExclusionRule::none()),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_trial_order_percentage() {
        let rule = ExclusionRule::none();
        let trial_sub = trial(sub(10, 1, SubscriptionStatus::Active, "20"));
        let paid_sub = sub(11, 2, SubscriptionStatus::Active, "20");
        let links = LinkedSubscriptions::new(vec![trial_sub, paid_sub], &rule);

        let mut with_trial = order(1, OrderStatus::Completed, "0", "0");
        with_trial.subscription_ids = vec![SubscriptionId::new(10)];
        let mut with_paid = order(2, OrderStatus::Processing, "20", "0");
        with_paid.subscription_ids = vec![SubscriptionId::new(11)];
        let plain = order(3, OrderStatus::Completed, "15", "0");

        let orders = vec![with_trial, with_paid, plain];
        assert_eq!(
            trial_order_percentage(&orders, &jan(1), &rule, &links),
            dec("33.33")
        );
        assert_eq!(
            trial_order_percentage(&[], &jan(1), &rule, &links),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_excluded_subscriptions_contribute_nothing() {
        let mut by_email = sub(1, 1, SubscriptionStatus::Active, "500");
        by_email.billing.email = " QA@Shop.Example ".to_string();
        let mut by_name = sub(2, 2, SubscriptionStatus::Expired, "300");
        by_name.billing = BillingDetails::new(" TEST ", "account", "other@example.com");
        let mut cancelled = sub(3, 3, SubscriptionStatus::Cancelled, "90");
        cancelled.billing.email = "qa@shop.example".to_string();
        cancelled.date_cancelled = Some(ts(1, 18));
        let member = sub(4, 4, SubscriptionStatus::Active, "20");

        let subs = vec![by_email, by_name, cancelled, member];
        let rule = internal();

        assert_eq!(new_members(&subs, &jan(1), &rule), 1);
        assert_eq!(cancellations(&subs, &jan(1), &rule), 0);
        // Only the $20 member counts.
        assert_eq!(rolling_ltv(&subs, &jan(1), &rule), dec("20"));
        assert_eq!(created_in_window(&subs, &jan(1), &rule).count(), 1);

        let none = ExclusionRule::none();
        assert_eq!(new_members(&subs, &jan(1), &none), 2);
        assert_eq!(cancellations(&subs, &jan(1), &none), 1);
    }

    #[test]
    fn test_excluded_orders_leave_trial_percentage_denominator() {
        let rule = internal();
        let trial_sub = trial(sub(10, 1, SubscriptionStatus::Active, "20"));
        let links = LinkedSubscriptions::new(vec![trial_sub], &rule);

        let mut with_trial = order(1, OrderStatus::Completed, "0", "0");
        with_trial.subscription_ids = vec![SubscriptionId::new(10)];
        let plain = order(2, OrderStatus::Completed, "15", "0");
        let mut internal_a = order(3, OrderStatus::Completed, "15", "0");
        internal_a.billing.email = "qa@shop.example".to_string();
        let mut internal_b = order(4, OrderStatus::Processing, "15", "0");
        internal_b.billing = BillingDetails::new("Test", "Account", "x@example.com");

        let orders = vec![with_trial, plain, internal_a, internal_b];
        // 1 of 2, not 1 of 4.
        assert_eq!(
            trial_order_percentage(&orders, &jan(1), &rule, &links),
            dec("50")
        );
    }

    #[test]
    fn test_linked_subscription_flags() {
        let rule = internal();
        let mut excluded_trial = trial(sub(20, 1, SubscriptionStatus::Active, "20"));
        excluded_trial.billing.email = "qa@shop.example".to_string();
        let member = sub(21, 2, SubscriptionStatus::Active, "20");
        let links = LinkedSubscriptions::new(vec![excluded_trial, member], &rule);

        let mut o = order(1, OrderStatus::Completed, "20", "0");
        o.subscription_ids = vec![SubscriptionId::new(20), SubscriptionId::new(21)];

        assert!(!links.order_has_trial(&o));
        assert!(links.order_is_new_member(&o));
    }
}
