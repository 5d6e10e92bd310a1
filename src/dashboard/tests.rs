#![allow(clippy::unwrap_used)]

use super::*;
use crate::db::memory::MemoryStore;
use crate::models::{Category, CategoryKind, TransactionType};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn txn(
    id: i64,
    date: NaiveDate,
    amount: Decimal,
    kind: TransactionType,
    method: PaymentMethod,
    category: Option<i64>,
) -> Transaction {
    let mut t = Transaction::new(date, format!("txn {id}"), amount, kind);
    t.id = Some(id);
    t.payment_method = method;
    t.category_id = category.map(CategoryId::from);
    t
}

fn store() -> MemoryStore {
    use PaymentMethod::*;
    use TransactionType::*;
    MemoryStore {
        transactions: vec![
            txn(1, d(2024, 5, 1), dec!(1000), Income, Transfer, Some(10)),
            txn(2, d(2024, 5, 2), dec!(300), Expense, DebitCard, Some(1)),
            txn(3, d(2024, 5, 9), dec!(200), Expense, Cash, Some(2)),
            txn(4, d(2024, 5, 9), dec!(50), Expense, CreditCard, Some(1)),
            txn(5, d(2024, 5, 20), dec!(80), Expense, CreditCard, None),
            txn(6, d(2024, 4, 28), dec!(999), Expense, Cash, Some(1)),
        ],
        categories: vec![
            Category {
                id: Some(CategoryId::from(1)),
                name: "Food".into(),
                kind: CategoryKind::Expense,
                parent_id: None,
            },
            Category {
                id: Some(CategoryId::from(2)),
                name: "Transport".into(),
                kind: CategoryKind::Expense,
                parent_id: None,
            },
        ],
        ..MemoryStore::default()
    }
}

fn may() -> ReportingPeriod {
    ReportingPeriod::from_ym(2024, 5).unwrap()
}

// ── load_dashboard ────────────────────────────────────────────

#[test]
fn test_dashboard_queries_the_period() {
    let store = store();
    load_dashboard(&store, may(), 3, &FlowLabels::default()).unwrap();
    let queries = store.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0], TransactionQuery::in_range(may().range()));
}

#[test]
fn test_dashboard_totals_exclude_other_months() {
    let store = store();
    let data = load_dashboard(&store, may(), 3, &FlowLabels::default()).unwrap();
    assert_eq!(data.summary.total_income, dec!(1000));
    assert_eq!(data.summary.total_expenses, dec!(630));
    assert_eq!(data.summary.total_savings, dec!(370));
    assert_eq!(data.transaction_count, 5);
}

#[test]
fn test_dashboard_flow_uses_category_names() {
    let store = store();
    let data = load_dashboard(&store, may(), 3, &FlowLabels::default()).unwrap();
    let names: Vec<&str> = data
        .summary
        .flow_graph
        .nodes
        .iter()
        .map(|n| n.display_name.as_str())
        .collect();
    assert_eq!(names, ["Income", "Food", "Transport", "Uncategorized", "Savings"]);
    assert_eq!(data.category_names[&CategoryId::from(1)], "Food");
}

#[test]
fn test_dashboard_recent_is_newest_first_and_limited() {
    let store = store();
    let data = load_dashboard(&store, may(), 3, &FlowLabels::default()).unwrap();
    let ids: Vec<i64> = data.recent.iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, [5, 4, 3]);

    let data = load_dashboard(&store, may(), 0, &FlowLabels::default()).unwrap();
    assert!(data.recent.is_empty());
}

#[test]
fn test_dashboard_empty_month() {
    let store = store();
    let june = ReportingPeriod::from_ym(2024, 6).unwrap();
    let data = load_dashboard(&store, june, 3, &FlowLabels::default()).unwrap();
    assert_eq!(data.summary.total_income, Decimal::ZERO);
    assert!(data.summary.flow_graph.is_empty());
    assert!(data.recent.is_empty());
    assert_eq!(data.transaction_count, 0);
}

#[test]
fn test_dashboard_negative_amount_is_an_error() {
    let mut store = store();
    store.transactions[1].amount = dec!(-300);
    let err = load_dashboard(&store, may(), 3, &FlowLabels::default()).unwrap_err();
    assert!(err.to_string().contains("2024-05"));
}

// ── TransactionFilters ────────────────────────────────────────

#[test]
fn test_filters_default_to_month_to_date() {
    let filters = TransactionFilters::month_to_date(d(2024, 5, 17));
    assert_eq!(filters.range.start(), d(2024, 5, 1));
    assert_eq!(filters.range.end(), d(2024, 5, 17));
    assert!(!filters.is_filtered());
}

#[test]
fn test_toggle_adds_then_removes() {
    let mut filters = TransactionFilters::month_to_date(d(2024, 5, 17));
    filters.toggle_payment_method(PaymentMethod::Cash);
    filters.toggle_payment_method(PaymentMethod::CreditCard);
    assert_eq!(
        filters.payment_methods,
        [PaymentMethod::Cash, PaymentMethod::CreditCard]
    );
    filters.toggle_payment_method(PaymentMethod::Cash);
    assert_eq!(filters.payment_methods, [PaymentMethod::CreditCard]);

    filters.toggle_category(CategoryId::from(2));
    assert!(filters.is_filtered());
    filters.toggle_category(CategoryId::from(2));
    assert!(filters.category_ids.is_empty());
}

#[test]
fn test_clear_keeps_range() {
    let mut filters = TransactionFilters::month_to_date(d(2024, 5, 17));
    filters.toggle_payment_method(PaymentMethod::Cash);
    filters.toggle_category(CategoryId::from(1));
    filters.search = Some("coffee".into());
    filters.clear();
    assert!(!filters.is_filtered());
    assert_eq!(filters.range.end(), d(2024, 5, 17));
}

// ── load_transactions ─────────────────────────────────────────

#[test]
fn test_load_transactions_applies_filters() {
    let store = store();
    let mut filters = TransactionFilters::month_to_date(d(2024, 5, 31));
    filters.toggle_category(CategoryId::from(1));
    let view = load_transactions(&store, &filters).unwrap();
    let ids: Vec<i64> = view.transactions.iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, [4, 2]);
    assert_eq!(store.queries.borrow()[0], filters.to_query());
}

#[test]
fn test_load_transactions_chart_covers_range() {
    let store = store();
    let filters = TransactionFilters::month_to_date(d(2024, 5, 10));
    let view = load_transactions(&store, &filters).unwrap();
    assert_eq!(view.chart.days.len(), 10);
    assert_eq!(view.chart.series_total(&PaymentMethod::CreditCard), dec!(50));
    assert_eq!(view.chart.series_total(&PaymentMethod::Cash), dec!(200));
    // Income never reaches the chart.
    assert_eq!(view.chart.series_total(&PaymentMethod::Transfer), Decimal::ZERO);
    assert_eq!(view.chart.day_total(8), dec!(250));
}

#[test]
fn test_load_transactions_names_categories() {
    let store = store();
    let view = load_transactions(&store, &TransactionFilters::month_to_date(d(2024, 5, 31))).unwrap();
    assert_eq!(view.category_names.len(), 2);
    assert_eq!(view.transactions.len(), 5);
}
