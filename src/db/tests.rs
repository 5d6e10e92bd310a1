#![allow(clippy::unwrap_used)]

use super::*;
use crate::period::DateRange;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn category_id(db: &Database, name: &str) -> CategoryId {
    let cats = db.categories().unwrap();
    Category::find_by_name(&cats, name)
        .and_then(|c| c.id.clone())
        .unwrap()
}

fn make_txn(
    date: NaiveDate,
    description: &str,
    amount: Decimal,
    kind: TransactionType,
    method: PaymentMethod,
    category: Option<CategoryId>,
) -> Transaction {
    let mut t = Transaction::new(date, description.into(), amount, kind);
    t.payment_method = method;
    t.category_id = category;
    t
}

fn setup_test_data(db: &mut Database) {
    let rent = category_id(db, "Rent");
    let groceries = category_id(db, "Groceries");
    let txns = vec![
        make_txn(
            d(2024, 1, 1),
            "Paycheck",
            dec!(3000),
            TransactionType::Income,
            PaymentMethod::Transfer,
            None,
        ),
        make_txn(
            d(2024, 1, 3),
            "January rent",
            dec!(1200),
            TransactionType::Expense,
            PaymentMethod::Transfer,
            Some(rent),
        ),
        make_txn(
            d(2024, 1, 10),
            "Market",
            dec!(85.40),
            TransactionType::Expense,
            PaymentMethod::DebitCard,
            Some(groceries.clone()),
        ),
        make_txn(
            d(2024, 1, 20),
            "Corner shop",
            dec!(12.60),
            TransactionType::Expense,
            PaymentMethod::Cash,
            Some(groceries),
        ),
        make_txn(
            d(2024, 2, 2),
            "February coffee",
            dec!(4.50),
            TransactionType::Expense,
            PaymentMethod::CreditCard,
            None,
        ),
    ];
    db.insert_transactions_batch(&txns).unwrap();
}

fn january() -> TransactionQuery {
    TransactionQuery::in_range(DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap())
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.categories().unwrap();
    assert!(cats.iter().any(|c| c.name == "Salary" && c.kind == CategoryKind::Income));
    assert!(cats.iter().any(|c| c.name == "Rent" && c.kind == CategoryKind::Expense));
    assert!(cats.iter().all(|c| c.id.as_ref().and_then(CategoryId::as_i64).is_some()));
}

#[test]
fn test_open_file_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowdash.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_category(&Category::new("Pets".into(), CategoryKind::Expense))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let cats = db.categories().unwrap();
    assert!(Category::find_by_name(&cats, "Pets").is_some());
    assert_eq!(cats.iter().filter(|c| c.name == "Rent").count(), 1);
}

// ── Categories and accounts ───────────────────────────────────

#[test]
fn test_insert_category_returns_string_id() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_category(&Category::new("Pets".into(), CategoryKind::Expense))
        .unwrap();
    assert!(id.as_i64().is_some());
    let names = category_names(&db.categories().unwrap());
    assert_eq!(names[&id], "Pets");
}

#[test]
fn test_insert_category_duplicate_name_fails() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .insert_category(&Category::new("Rent".into(), CategoryKind::Expense))
        .unwrap_err();
    assert!(err.to_string().contains("Rent"));
}

#[test]
fn test_insert_category_with_parent() {
    let db = Database::open_in_memory().unwrap();
    let parent = category_id(&db, "Travel");
    let mut child = Category::new("Flights".into(), CategoryKind::Expense);
    child.parent_id = Some(parent.clone());
    db.insert_category(&child).unwrap();
    let cats = db.categories().unwrap();
    assert_eq!(
        Category::find_by_name(&cats, "Flights").unwrap().parent_id,
        Some(parent)
    );
}

#[test]
fn test_insert_category_rejects_non_numeric_parent() {
    let db = Database::open_in_memory().unwrap();
    let mut child = Category::new("Flights".into(), CategoryKind::Expense);
    child.parent_id = Some(CategoryId::from("travel"));
    assert!(db.insert_category(&child).is_err());
}

#[test]
fn test_account_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut acct = Account::new("Nómina".into(), AccountType::Checking, "BBVA".into());
    acct.balance = dec!(1520.75);
    acct.opened_date = Some(d(2020, 5, 1));
    let id = db.insert_account(&acct).unwrap();

    let accounts = db.accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, Some(id));
    assert_eq!(accounts[0].balance, dec!(1520.75));
    assert_eq!(accounts[0].opened_date, Some(d(2020, 5, 1)));
    assert_eq!(accounts[0].account_type, AccountType::Checking);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transactions_newest_first() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let txns = db.transactions(&TransactionQuery::default()).unwrap();
    assert_eq!(txns.len(), 5);
    let dates: Vec<NaiveDate> = txns.iter().map(|t| t.transaction_date).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);
    assert_eq!(txns[0].description, "February coffee");
}

#[test]
fn test_transaction_fields_roundtrip() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let txns = db.transactions(&january()).unwrap();
    let market = txns.iter().find(|t| t.description == "Market").unwrap();
    assert_eq!(market.amount, dec!(85.40));
    assert_eq!(market.transaction_type, TransactionType::Expense);
    assert_eq!(market.payment_method, PaymentMethod::DebitCard);
    assert_eq!(market.category_id, Some(category_id(&db, "Groceries")));
    assert!(market.id.is_some());
}

#[test]
fn test_filter_by_range() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let txns = db.transactions(&january()).unwrap();
    assert_eq!(txns.len(), 4);
    assert!(txns.iter().all(|t| t.transaction_date.format("%Y-%m").to_string() == "2024-01"));
}

#[test]
fn test_filter_range_inclusive_bounds() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let query = TransactionQuery::in_range(DateRange::new(d(2024, 1, 3), d(2024, 1, 10)).unwrap());
    let descriptions: Vec<String> = db
        .transactions(&query)
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(descriptions, ["Market", "January rent"]);
}

#[test]
fn test_filter_by_payment_method() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let mut query = january();
    query.payment_methods = vec![PaymentMethod::Cash, PaymentMethod::DebitCard];
    let txns = db.transactions(&query).unwrap();
    assert_eq!(txns.len(), 2);
    assert!(txns
        .iter()
        .all(|t| matches!(t.payment_method, PaymentMethod::Cash | PaymentMethod::DebitCard)));
}

#[test]
fn test_filter_by_category() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let mut query = TransactionQuery::default();
    query.category_ids = vec![category_id(&db, "Groceries")];
    let txns = db.transactions(&query).unwrap();
    assert_eq!(txns.len(), 2);
}

#[test]
fn test_filter_by_non_numeric_category_matches_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let mut query = TransactionQuery::default();
    query.category_ids = vec![CategoryId::from("groceries")];
    assert!(db.transactions(&query).unwrap().is_empty());
}

#[test]
fn test_filter_mixed_category_ids_uses_numeric_ones() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let mut query = TransactionQuery::default();
    query.category_ids = vec![CategoryId::from("bogus"), category_id(&db, "Rent")];
    let txns = db.transactions(&query).unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].description, "January rent");
}

#[test]
fn test_search_and_limit() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let query = TransactionQuery {
        search: Some("rent".into()),
        ..TransactionQuery::default()
    };
    assert_eq!(db.transactions(&query).unwrap().len(), 1);

    let query = TransactionQuery {
        limit: Some(2),
        ..TransactionQuery::default()
    };
    assert_eq!(db.transactions(&query).unwrap().len(), 2);
}

#[test]
fn test_batch_skips_duplicates() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    setup_test_data(&mut db);
    assert_eq!(db.transaction_count().unwrap(), 5);
}

#[test]
fn test_identical_rows_in_one_batch_both_kept() {
    let mut db = Database::open_in_memory().unwrap();
    let coffee = make_txn(
        d(2024, 3, 1),
        "Coffee",
        dec!(3),
        TransactionType::Expense,
        PaymentMethod::Cash,
        None,
    );
    let batch = vec![coffee.clone(), coffee.clone(), coffee];
    assert_eq!(db.insert_transactions_batch(&batch).unwrap(), 3);
    assert_eq!(db.insert_transactions_batch(&batch).unwrap(), 0);
    assert_eq!(db.insert_transactions_batch(&batch[..2]).unwrap(), 0);
    assert_eq!(db.transaction_count().unwrap(), 3);
}

#[test]
fn test_manual_insert_not_deduplicated() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn(
        d(2024, 3, 1),
        "Coffee",
        dec!(3),
        TransactionType::Expense,
        PaymentMethod::Cash,
        None,
    );
    db.insert_transaction(&txn).unwrap();
    db.insert_transaction(&txn).unwrap();
    assert_eq!(db.transaction_count().unwrap(), 2);
}

#[test]
fn test_insert_rejects_non_numeric_category() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn(
        d(2024, 3, 1),
        "Coffee",
        dec!(3),
        TransactionType::Expense,
        PaymentMethod::Cash,
        Some(CategoryId::from("coffee")),
    );
    assert!(db.insert_transaction(&txn).is_err());
}

#[test]
fn test_other_types_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let txn = make_txn(
        d(2024, 3, 1),
        "To brokerage",
        dec!(500),
        TransactionType::Other("investment".into()),
        PaymentMethod::Other("wire".into()),
        None,
    );
    db.insert_transaction(&txn).unwrap();
    let stored = db.transactions(&TransactionQuery::default()).unwrap();
    assert_eq!(stored[0].transaction_type, TransactionType::Other("investment".into()));
    assert_eq!(stored[0].payment_method, PaymentMethod::Other("wire".into()));
}

#[test]
fn test_delete_transaction() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let first = db.transactions(&TransactionQuery::default()).unwrap()[0].id.unwrap();
    db.delete_transaction(first).unwrap();
    assert_eq!(db.transaction_count().unwrap(), 4);
    assert!(db.delete_transaction(first).is_err());
}

#[test]
fn test_corrupt_amount_is_an_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO transactions (amount, transaction_date, transaction_type, created_at, updated_at)
             VALUES ('abc', '2024-01-01', 'expense', '', '')",
            [],
        )
        .unwrap();
    assert!(db.transactions(&TransactionQuery::default()).is_err());
}

// ── In-memory store parity ────────────────────────────────────

#[test]
fn test_query_matches_agrees_with_sql() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    let all = db.transactions(&TransactionQuery::default()).unwrap();

    let mut query = january();
    query.payment_methods = vec![PaymentMethod::Transfer];
    query.search = Some("RENT".into());

    let from_sql = db.transactions(&query).unwrap();
    let in_memory: Vec<&Transaction> = all.iter().filter(|t| query.matches(t)).collect();
    assert_eq!(from_sql.len(), in_memory.len());
    assert_eq!(from_sql[0].id, in_memory[0].id);
}

#[test]
fn test_search_wildcards_match_literally() {
    let mut db = Database::open_in_memory().unwrap();
    setup_test_data(&mut db);
    for desc in ["Shoes 50% off", "tag a_b", "tag axb", "C:\\temp"] {
        let txn = make_txn(
            d(2024, 1, 15),
            desc,
            dec!(1),
            TransactionType::Expense,
            PaymentMethod::Cash,
            None,
        );
        db.insert_transaction(&txn).unwrap();
    }
    let all = db.transactions(&TransactionQuery::default()).unwrap();

    for (search, expected) in [("%", 1), ("50%", 1), ("a_b", 1), ("_", 1), ("\\t", 1), ("tag", 2)] {
        let query = TransactionQuery {
            search: Some(search.into()),
            ..TransactionQuery::default()
        };
        let from_sql = db.transactions(&query).unwrap();
        let in_memory = all.iter().filter(|t| query.matches(t)).count();
        assert_eq!(from_sql.len(), expected, "search {search:?}");
        assert_eq!(in_memory, expected, "search {search:?}");
    }
}
