//! Detail rows for the order and cancellation sections.

use rust_decimal::Decimal;
use storemetrics_core::{Order, Subscription, product_names};

use crate::exclusion::ExclusionRule;
use crate::metrics::{self, LinkedSubscriptions};
use crate::report::{CancellationDetailRow, OrderDetailRow, REASON_NOT_SPECIFIED, REFUND_SUFFIX};
use crate::window::DateWindow;

/// Build the order detail section.
///
/// Sale orders created in the window come first, ordered by creation. Then
/// one extra row per refunded order modified in the window, ordered by
/// modification. A refund row is never merged into the sale row for the
/// same order, so an order sold and refunded in one window appears twice.
#[must_use]
pub fn order_rows(
    sales: &[Order],
    refunded: &[Order],
    window: &DateWindow,
    rule: &ExclusionRule,
    links: &LinkedSubscriptions,
) -> Vec<OrderDetailRow> {
    let mut sale_orders: Vec<&Order> = metrics::sales(sales, window, rule).collect();
    sale_orders.sort_by_key(|order| (order.date_created, order.id));

    let mut refund_orders: Vec<&Order> = metrics::refunded(refunded, window, rule).collect();
    refund_orders.sort_by_key(|order| (order.modified_or_created(), order.id));

    sale_orders
        .into_iter()
        .map(|order| sale_row(order, links))
        .chain(refund_orders.into_iter().map(|order| refund_row(order, links)))
        .collect()
}

fn sale_row(order: &Order, links: &LinkedSubscriptions) -> OrderDetailRow {
    OrderDetailRow {
        order_id: order.id.to_string(),
        date: order.date_created,
        customer_name: order.billing.full_name(),
        customer_email: order.billing.email.trim().to_string(),
        gross_revenue: order.subtotal,
        net_revenue: order.subtotal - order.total_discount - order.total_refunded,
        discounts: order.total_discount,
        refunds: order.total_refunded,
        is_trial: links.order_has_trial(order),
        is_new_member: links.order_is_new_member(order),
        products: product_names(&order.line_items),
    }
}

fn refund_row(order: &Order, links: &LinkedSubscriptions) -> OrderDetailRow {
    OrderDetailRow {
        order_id: format!("{}{REFUND_SUFFIX}", order.id),
        date: order.modified_or_created(),
        customer_name: order.billing.full_name(),
        customer_email: order.billing.email.trim().to_string(),
        gross_revenue: -order.total_refunded,
        net_revenue: -order.total_refunded,
        discounts: Decimal::ZERO,
        refunds: order.total_refunded,
        is_trial: links.order_has_trial(order),
        is_new_member: false,
        products: product_names(&order.line_items),
    }
}

/// Build the cancellation detail section from the same set the
/// cancellations metric counts.
#[must_use]
pub fn cancellation_rows(
    subscriptions: &[Subscription],
    window: &DateWindow,
    rule: &ExclusionRule,
) -> Vec<CancellationDetailRow> {
    metrics::cancelled_in_window(subscriptions, window, rule)
        .into_iter()
        .filter_map(|sub| {
            let cancelled = sub.effective_cancellation()?;
            Some(CancellationDetailRow {
                subscription_id: sub.id.to_string(),
                date_cancelled: cancelled,
                customer_name: sub.billing.full_name(),
                customer_email: sub.billing.email.trim().to_string(),
                subscription_value: sub.schedule.total,
                cancellation_reason: sub
                    .cancellation_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or(REASON_NOT_SPECIFIED)
                    .to_string(),
                days_active: (cancelled - sub.date_created).num_days(),
                products: product_names(&sub.line_items),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use storemetrics_core::{
        BillingDetails, BillingPeriod, BillingSchedule, CustomerId, Email, LineItem, OrderId,
        OrderStatus, SubscriptionId, SubscriptionStatus,
    };

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn ts(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
    }

    fn day(month: u32, day: u32) -> DateWindow {
        let d = NaiveDate::from_ymd_opt(2024, month, day).unwrap();
        DateWindow::days(d, d).unwrap()
    }

    fn order(id: i64, status: OrderStatus, created: NaiveDateTime) -> Order {
        Order {
            id: OrderId::new(id),
            status,
            date_created: created,
            date_modified: None,
            billing: BillingDetails::new("Ada", "Lovelace", "ada@example.com"),
            subtotal: dec("80"),
            total: dec("86.40"),
            total_discount: dec("8"),
            total_refunded: Decimal::ZERO,
            line_items: vec![
                LineItem::new(None, "Coffee Box"),
                LineItem::new(None, "Mug"),
            ],
            subscription_ids: Vec::new(),
        }
    }

    fn cancelled_sub(id: i64, created: NaiveDateTime, cancelled: NaiveDateTime) -> Subscription {
        Subscription {
            id: SubscriptionId::new(id),
            status: SubscriptionStatus::Cancelled,
            customer_id: CustomerId::new(id),
            date_created: created,
            date_modified: None,
            date_cancelled: Some(cancelled),
            billing: BillingDetails::new("Ada", "Lovelace", "ada@example.com"),
            schedule: BillingSchedule::new(BillingPeriod::Month, 1, dec("29.99")),
            line_items: vec![LineItem::new(None, "Coffee Box")],
            cancellation_reason: None,
        }
    }

    #[test]
    fn test_sale_row_values() {
        let orders = vec![order(42, OrderStatus::Completed, ts(1, 1, 10))];
        let rows = order_rows(
            &orders,
            &[],
            &day(1, 1),
            &ExclusionRule::none(),
            &LinkedSubscriptions::default(),
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.order_id, "42");
        assert_eq!(row.customer_name, "Ada Lovelace");
        assert_eq!(row.gross_revenue, dec("80"));
        assert_eq!(row.net_revenue, dec("72"));
        assert_eq!(row.products, "Coffee Box, Mug");
        assert!(!row.is_trial);
        assert!(!row.is_new_member);
    }

    #[test]
    fn test_refunded_order_in_same_window_gives_two_rows() {
        let mut refunded = order(7, OrderStatus::Refunded, ts(1, 1, 9));
        refunded.date_modified = Some(ts(1, 1, 17));
        refunded.total_refunded = dec("80");
        let orders = vec![refunded];

        let rows = order_rows(
            &orders,
            &orders,
            &day(1, 1),
            &ExclusionRule::none(),
            &LinkedSubscriptions::default(),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id, "7");
        assert_eq!(rows[0].net_revenue, dec("-8"));
        assert_eq!(rows[1].order_id, "7 (REFUND)");
        assert_eq!(rows[1].date, ts(1, 1, 17));
        assert_eq!(rows[1].gross_revenue, dec("-80"));
        assert_eq!(rows[1].net_revenue, dec("-80"));
        assert_eq!(rows[1].discounts, Decimal::ZERO);
        assert_eq!(rows[1].refunds, dec("80"));
        assert!(!rows[1].is_new_member);
    }

    #[test]
    fn test_refunded_order_across_windows_splits_rows() {
        let mut refunded = order(8, OrderStatus::Refunded, ts(1, 1, 9));
        refunded.date_modified = Some(ts(1, 5, 12));
        refunded.total_refunded = dec("80");
        let orders = vec![refunded];
        let rule = ExclusionRule::none();
        let links = LinkedSubscriptions::default();

        let sale_day = order_rows(&orders, &orders, &day(1, 1), &rule, &links);
        let refund_day = order_rows(&orders, &orders, &day(1, 5), &rule, &links);

        let ids: Vec<_> = sale_day
            .iter()
            .chain(refund_day.iter())
            .map(|row| row.order_id.as_str())
            .collect();
        assert_eq!(ids, vec!["8", "8 (REFUND)"]);
    }

    #[test]
    fn test_excluded_orders_have_no_rows() {
        let mut refunded = order(9, OrderStatus::Refunded, ts(1, 1, 9));
        refunded.date_modified = Some(ts(1, 1, 10));
        refunded.billing.email = "internal@shop.example".to_string();
        let orders = vec![refunded];
        let rule = ExclusionRule::none().with_email(Email::parse("internal@shop.example").unwrap());

        let rows = order_rows(
            &orders,
            &orders,
            &day(1, 1),
            &rule,
            &LinkedSubscriptions::default(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_cancellation_row_values() {
        let mut with_reason = cancelled_sub(3, ts(1, 1, 12), ts(1, 31, 11));
        with_reason.cancellation_reason = Some("Too expensive".to_string());
        let mut blank_reason = cancelled_sub(4, ts(1, 20, 8), ts(1, 31, 9));
        blank_reason.cancellation_reason = Some("   ".to_string());

        let subs = vec![with_reason, blank_reason];
        let rows = cancellation_rows(&subs, &day(1, 31), &ExclusionRule::none());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].subscription_id, "4");
        assert_eq!(rows[0].cancellation_reason, "Not specified");
        assert_eq!(rows[0].days_active, 11);
        assert_eq!(rows[1].subscription_id, "3");
        assert_eq!(rows[1].cancellation_reason, "Too expensive");
        // 29 days and 23 hours: whole days only.
        assert_eq!(rows[1].days_active, 29);
        assert_eq!(rows[1].subscription_value, dec("29.99"));
        assert_eq!(rows[1].products, "Coffee Box");
    }
}
