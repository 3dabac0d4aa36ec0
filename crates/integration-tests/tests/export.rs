//! End-to-end export tests: in-memory store, recording sheet writer.

use rust_decimal::Decimal;
use storemetrics_core::{Period, SubscriptionStatus};
use storemetrics_integration_tests::{
    OrderBuilder, RecordingWriter, SubscriptionBuilder, WriterCall, at, date, dec, test_config,
};
use storemetrics_reporting::{
    ConfigError, ExportError, ExportOutcome, MemoryStore, ReportExporter, ReportingConfig,
    SheetsError,
};

// =============================================================================
// Successful Exports
// =============================================================================

#[tokio::test]
async fn test_daily_export_creates_and_fills_sheet() {
    let store = MemoryStore::new()
        .with_order(
            OrderBuilder::new(1001, at(2024, 1, 1, 9, 30), "100")
                .discount("10")
                .build(),
        )
        .with_subscription(SubscriptionBuilder::new(501, at(2024, 1, 1, 9, 30), "25").build());
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let outcome = exporter
        .export_report(Period::Daily, Some(date(2024, 1, 1)))
        .await
        .expect("export succeeds");

    assert!(outcome.success);
    assert_eq!(outcome.revenue, Some(dec("90")));
    assert_eq!(outcome.gross_revenue, Some(dec("100")));
    assert_eq!(outcome.new_members, Some(1));
    assert_eq!(outcome.cancellations, Some(0));
    assert_eq!(outcome.sheet_name.as_deref(), Some("2024-01-01"));

    let calls = writer.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        WriterCall::CreateSheet {
            spreadsheet_id: "sheet-abc".to_string(),
            sheet_name: "2024-01-01".to_string(),
        }
    );
    match &calls[1] {
        WriterCall::WriteGrid {
            spreadsheet_id,
            sheet_name,
            top_left,
            grid,
        } => {
            assert_eq!(spreadsheet_id, "sheet-abc");
            assert_eq!(sheet_name, "2024-01-01");
            assert_eq!(top_left, "A1");
            assert_eq!(grid[0][0], "Daily Report - 2024-01-01");
            assert_eq!(grid[3][1], "$90.00");
            assert!(grid.iter().any(|row| row.first().is_some_and(|c| c == "1001")));
        }
        other => panic!("expected a grid write, got {other:?}"),
    }
}

#[tokio::test]
async fn test_weekly_and_monthly_sheet_names() {
    let store = MemoryStore::new()
        .with_order(OrderBuilder::new(1, at(2024, 2, 14, 12, 0), "40").build());
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let weekly = exporter
        .export_report(Period::Weekly, Some(date(2024, 2, 15)))
        .await
        .expect("weekly export");
    let monthly = exporter
        .export_report(Period::Monthly, Some(date(2024, 2, 15)))
        .await
        .expect("monthly export");

    assert_eq!(
        weekly.sheet_name.as_deref(),
        Some("Week 2024-02-09 to 2024-02-15")
    );
    assert_eq!(
        monthly.sheet_name.as_deref(),
        Some("Month 2024-02-01 to 2024-02-29")
    );
}

// =============================================================================
// No-Op Exports
// =============================================================================

#[tokio::test]
async fn test_empty_window_is_successful_no_op() {
    let store = MemoryStore::new()
        .with_order(OrderBuilder::new(1, at(2024, 1, 5, 12, 0), "40").build());
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let outcome = exporter
        .export_report(Period::Daily, Some(date(2024, 1, 1)))
        .await
        .expect("empty export succeeds");

    assert!(outcome.success);
    assert_eq!(outcome.revenue, Some(Decimal::ZERO));
    assert!(outcome.message.to_lowercase().contains("no data"));
    assert!(outcome.sheet_name.is_none());
    assert!(writer.calls().is_empty());
}

#[tokio::test]
async fn test_subscription_only_window_is_exported() {
    let store = MemoryStore::new().with_subscription(
        SubscriptionBuilder::new(501, at(2024, 1, 1, 9, 30), "10")
            .status(SubscriptionStatus::Expired)
            .build(),
    );
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let outcome = exporter
        .export_report(Period::Daily, Some(date(2024, 1, 1)))
        .await
        .expect("export succeeds");

    assert!(outcome.success);
    assert_eq!(outcome.sheet_name.as_deref(), Some("2024-01-01"));
    let calls = writer.calls();
    assert_eq!(calls.len(), 2);
    match &calls[1] {
        WriterCall::WriteGrid { grid, .. } => {
            let ltv = grid
                .iter()
                .find(|row| row.first().is_some_and(|c| c == "Rolling LTV"))
                .expect("LTV row present");
            assert_eq!(ltv[1], "$10.00");
        }
        other => panic!("expected a grid write, got {other:?}"),
    }
}

#[tokio::test]
async fn test_only_excluded_records_is_no_op() {
    let store = MemoryStore::new().with_order(
        OrderBuilder::new(1, at(2024, 1, 1, 12, 0), "40")
            .billing(storemetrics_integration_tests::internal_account())
            .build(),
    );
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let outcome = exporter
        .export_report(Period::Daily, Some(date(2024, 1, 1)))
        .await
        .expect("export succeeds");

    assert!(outcome.success);
    assert!(writer.calls().is_empty());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_disabled_period_is_config_error() {
    let writer = RecordingWriter::default();
    let exporter = ReportExporter::new(MemoryStore::new(), &writer, ReportingConfig::default());

    let err = exporter
        .export_report(Period::Monthly, Some(date(2024, 1, 1)))
        .await
        .expect_err("disabled period");

    assert!(matches!(
        err,
        ExportError::Config(ConfigError::PeriodDisabled(Period::Monthly))
    ));
    assert!(writer.calls().is_empty());
}

#[tokio::test]
async fn test_sheet_failure_propagates_after_aggregation() {
    let store = MemoryStore::new()
        .with_order(OrderBuilder::new(1, at(2024, 1, 1, 12, 0), "40").build());
    let writer = RecordingWriter::failing();
    let exporter = ReportExporter::new(store, &writer, test_config("sheet-abc"));

    let err = exporter
        .export_report(Period::Daily, Some(date(2024, 1, 1)))
        .await
        .expect_err("writer failure");

    assert!(matches!(err, ExportError::Sheets(SheetsError::Request(_))));
    // The grid is never written once sheet creation fails.
    assert_eq!(writer.calls().len(), 1);

    let outcome = ExportOutcome::from_error(&err);
    assert!(!outcome.success);
    assert!(outcome.message.contains("connection reset"));
}
