//! Flat grid rendering of a [`ReportResult`].
//!
//! The layout is fixed: title, summary block, order details, cancellation
//! details. Sections are never dropped or reordered, so an empty report
//! still renders every header.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::report::{CancellationDetailRow, OrderDetailRow, ReportResult};

/// Rows of string cells, ready for a spreadsheet.
pub type Grid = Vec<Vec<String>>;

/// Column names of the order detail section.
pub const ORDER_HEADERS: [&str; 11] = [
    "Order ID",
    "Date",
    "Customer Name",
    "Customer Email",
    "Gross Revenue",
    "Net Revenue",
    "Discounts",
    "Refunds",
    "Trial",
    "New Member",
    "Products",
];

/// Column names of the cancellation detail section.
pub const CANCELLATION_HEADERS: [&str; 8] = [
    "Subscription ID",
    "Date Cancelled",
    "Customer Name",
    "Customer Email",
    "Subscription Value",
    "Cancellation Reason",
    "Days Active",
    "Products",
];

/// Banner row opening the cancellation section.
pub const CANCELLATIONS_BANNER: &str = "CANCELLATIONS";

/// Number of summary rows before the trial percentage row.
pub const SUMMARY_ROWS: usize = 9;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const USD: &str = "USD";
const COUNT: &str = "Count";

/// Render a report into a grid.
#[must_use]
pub fn format_report(report: &ReportResult) -> Grid {
    let period = report.period.as_str();
    let mut grid: Grid = Vec::new();

    grid.push(row([
        format!("{} Report - {}", report.period.title(), report.reference_date),
        String::new(),
        String::new(),
        String::new(),
    ]));
    grid.push(Vec::new());
    grid.push(row(["Metric", "Value", "Currency", "Notes"].map(String::from)));

    grid.push(money_metric(
        &format!("Net Revenue ({period})"),
        report.net_revenue,
        "Total sales minus discounts and refunds (excluding shipping/taxes)",
    ));
    grid.push(money_metric(
        &format!("Gross Revenue ({period})"),
        report.gross_revenue,
        "Total sales excluding shipping and taxes",
    ));
    grid.push(money_metric(
        &format!("Discounts Given ({period})"),
        report.discounts_given,
        "Total discounts applied to orders",
    ));
    grid.push(money_metric(
        &format!("Refunds ({period})"),
        report.refunds,
        "Total amount refunded to customers",
    ));
    grid.push(count_metric(
        &format!("Trials Started ({period})"),
        report.trials_started,
        "Number of free trial subscriptions started",
    ));
    grid.push(count_metric(
        &format!("New Members ({period})"),
        report.new_members,
        "New paid subscribers (excluding free trials)",
    ));
    grid.push(count_metric(
        &format!("Cancellations ({period})"),
        report.cancellations,
        "Number of subscriptions cancelled by customers",
    ));
    grid.push(count_metric(
        &format!("Net Paid Subscriber Growth ({period})"),
        report.net_paid_subscriber_growth,
        "New paid subscribers minus cancellations",
    ));
    grid.push(money_metric(
        "Rolling LTV",
        report.rolling_ltv,
        "Average monthly subscription revenue per customer",
    ));
    grid.push(row([
        format!("Trial Order Percentage ({period})"),
        format!("{}%", two_places(report.trial_order_percentage)),
        "Percent".to_string(),
        "Share of orders whose subscription started with a free trial".to_string(),
    ]));

    grid.push(Vec::new());
    grid.push(Vec::new());

    grid.push(row(ORDER_HEADERS.map(String::from)));
    grid.extend(report.detailed_orders.iter().map(order_row));

    grid.push(Vec::new());
    grid.push(vec![CANCELLATIONS_BANNER.to_string()]);
    grid.push(padded(CANCELLATION_HEADERS.iter().map(ToString::to_string)));
    grid.extend(report.detailed_cancellations.iter().map(cancellation_row));

    grid
}

/// Format an amount as dollars with two decimals and comma-grouped
/// thousands, e.g. `$1,234.50` or `$-45.00`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let fixed = two_places(amount);
    let (sign, unsigned) = fixed
        .strip_prefix('-')
        .map_or(("", fixed.as_str()), |rest| ("-", rest));
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("${sign}{}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn two_places(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn timestamp(ts: NaiveDateTime) -> String {
    ts.format(DATE_FORMAT).to_string()
}

fn row<const N: usize>(cells: [String; N]) -> Vec<String> {
    cells.into()
}

/// Pad a detail row to the width of the order section.
fn padded(cells: impl Iterator<Item = String>) -> Vec<String> {
    let mut cells: Vec<String> = cells.collect();
    cells.resize(ORDER_HEADERS.len(), String::new());
    cells
}

fn money_metric(label: &str, value: Decimal, note: &str) -> Vec<String> {
    row([
        label.to_string(),
        format_money(value),
        USD.to_string(),
        note.to_string(),
    ])
}

fn count_metric(label: &str, value: i64, note: &str) -> Vec<String> {
    row([
        label.to_string(),
        value.to_string(),
        COUNT.to_string(),
        note.to_string(),
    ])
}

fn order_row(detail: &OrderDetailRow) -> Vec<String> {
    row([
        detail.order_id.clone(),
        timestamp(detail.date),
        detail.customer_name.clone(),
        detail.customer_email.clone(),
        format_money(detail.gross_revenue),
        format_money(detail.net_revenue),
        format_money(detail.discounts),
        format_money(detail.refunds),
        yes_no(detail.is_trial).to_string(),
        yes_no(detail.is_new_member).to_string(),
        detail.products.clone(),
    ])
}

fn cancellation_row(detail: &CancellationDetailRow) -> Vec<String> {
    padded(
        [
            detail.subscription_id.clone(),
            timestamp(detail.date_cancelled),
            detail.customer_name.clone(),
            detail.customer_email.clone(),
            format_money(detail.subscription_value),
            detail.cancellation_reason.clone(),
            detail.days_active.to_string(),
            detail.products.clone(),
        ]
        .into_iter(),
    )
}
