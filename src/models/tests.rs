#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn make_txn(amount: Decimal, kind: TransactionType) -> Transaction {
    Transaction::new(
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        "Test".into(),
        amount,
        kind,
    )
}

// ── Transaction ───────────────────────────────────────────────

#[test]
fn test_income() {
    let txn = make_txn(dec!(100.00), TransactionType::Income);
    assert!(txn.is_income());
    assert!(!txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(100.00));
}

#[test]
fn test_expense() {
    let txn = make_txn(dec!(50.00), TransactionType::Expense);
    assert!(!txn.is_income());
    assert!(txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(-50.00));
}

#[test]
fn test_other_type_is_neither() {
    let txn = make_txn(dec!(75), TransactionType::Other("transfer".into()));
    assert!(!txn.is_income());
    assert!(!txn.is_expense());
    assert_eq!(txn.signed_amount(), Decimal::ZERO);
}

// ── TransactionType ───────────────────────────────────────────

#[test]
fn test_transaction_type_parse() {
    assert_eq!(TransactionType::parse("income"), TransactionType::Income);
    assert_eq!(TransactionType::parse(" Expense "), TransactionType::Expense);
    assert_eq!(
        TransactionType::parse("investment"),
        TransactionType::Other("investment".into())
    );
}

#[test]
fn test_transaction_type_as_str_roundtrips_known_values() {
    for kind in [TransactionType::Income, TransactionType::Expense] {
        assert_eq!(TransactionType::parse(kind.as_str()), kind);
    }
}

// ── PaymentMethod ─────────────────────────────────────────────

#[test]
fn test_payment_method_parse_is_case_insensitive() {
    assert_eq!(PaymentMethod::parse("CASH"), PaymentMethod::Cash);
    assert_eq!(PaymentMethod::parse("Credit_Card"), PaymentMethod::CreditCard);
    assert_eq!(PaymentMethod::parse("debit card"), PaymentMethod::DebitCard);
    assert_eq!(PaymentMethod::parse("Transfer"), PaymentMethod::Transfer);
}

#[test]
fn test_payment_method_aliases() {
    assert_eq!(PaymentMethod::parse("card"), PaymentMethod::CreditCard);
    assert_eq!(PaymentMethod::parse("debit"), PaymentMethod::DebitCard);
}

#[test]
fn test_payment_method_unknown_kept() {
    assert_eq!(
        PaymentMethod::parse("check"),
        PaymentMethod::Other("check".into())
    );
    assert_eq!(PaymentMethod::parse("check").label(), "check");
}

#[test]
fn test_charted_methods_order() {
    let names: Vec<&str> = PaymentMethod::charted().iter().map(|m| m.as_str()).collect();
    assert_eq!(names, ["cash", "credit_card", "debit_card", "transfer"]);
}

// ── CategoryId ────────────────────────────────────────────────

#[test]
fn test_category_id_from_integer() {
    let id = CategoryId::from(42);
    assert_eq!(id.as_str(), "42");
    assert_eq!(id.as_i64(), Some(42));
}

#[test]
fn test_category_id_integer_and_string_forms_match() {
    assert_eq!(CategoryId::from(7), CategoryId::from("7"));
    assert_eq!(CategoryId::from(" 7 "), CategoryId::from(7));
}

#[test]
fn test_category_id_non_numeric() {
    let id = CategoryId::from("food");
    assert_eq!(id.as_i64(), None);
    assert_eq!(id.to_string(), "food");
}

// ── Category ──────────────────────────────────────────────────

fn sample_categories() -> Vec<Category> {
    vec![
        Category {
            id: Some(CategoryId::from(1)),
            name: "Groceries".into(),
            kind: CategoryKind::Expense,
            parent_id: None,
        },
        Category {
            id: Some(CategoryId::from(2)),
            name: "Salary".into(),
            kind: CategoryKind::Income,
            parent_id: None,
        },
        Category::new("Unsaved".into(), CategoryKind::Expense),
    ]
}

#[test]
fn test_find_by_name_case_insensitive() {
    let cats = sample_categories();
    assert_eq!(
        Category::find_by_name(&cats, "groceries").unwrap().id,
        Some(CategoryId::from(1))
    );
    assert!(Category::find_by_name(&cats, "Rent").is_none());
}

#[test]
fn test_resolve_prefers_id() {
    let cats = sample_categories();
    assert_eq!(Category::resolve(&cats, "2").unwrap().name, "Salary");
    assert_eq!(Category::resolve(&cats, "SALARY").unwrap().name, "Salary");
    assert!(Category::resolve(&cats, "99").is_none());
}

#[test]
fn test_category_names_skips_unsaved() {
    let names = category_names(&sample_categories());
    assert_eq!(names.len(), 2);
    assert_eq!(names[&CategoryId::from(1)], "Groceries");
}

#[test]
fn test_category_kind_parse_defaults_to_expense() {
    assert_eq!(CategoryKind::parse("income"), CategoryKind::Income);
    assert_eq!(CategoryKind::parse("INVESTMENT"), CategoryKind::Investment);
    assert_eq!(CategoryKind::parse("whatever"), CategoryKind::Expense);
}

// ── Account ───────────────────────────────────────────────────

#[test]
fn test_account_type_parse() {
    assert_eq!(AccountType::parse("savings"), AccountType::Savings);
    assert_eq!(AccountType::parse("Credit Card"), AccountType::Credit);
    assert_eq!(AccountType::parse("investment"), AccountType::Investment);
    assert_eq!(AccountType::parse("unknown"), AccountType::Checking);
}

#[test]
fn test_account_new_defaults() {
    let acct = Account::new("Main".into(), AccountType::Checking, "Bank".into());
    assert!(acct.id.is_none());
    assert_eq!(acct.balance, Decimal::ZERO);
    assert!(acct.opened_date.is_none());
}
