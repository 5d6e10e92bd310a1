mod schema;
mod store;

#[cfg(test)]
pub(crate) mod memory;

pub(crate) use store::{FinanceStore, TransactionQuery};

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .context("Failed to read schema version")?;

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Salary", CategoryKind::Income),
            ("Freelance", CategoryKind::Income),
            ("Investments", CategoryKind::Investment),
            ("Rent", CategoryKind::Expense),
            ("Groceries", CategoryKind::Expense),
            ("Restaurants", CategoryKind::Expense),
            ("Transportation", CategoryKind::Expense),
            ("Utilities", CategoryKind::Expense),
            ("Health", CategoryKind::Expense),
            ("Education", CategoryKind::Expense),
            ("Entertainment", CategoryKind::Expense),
            ("Travel", CategoryKind::Expense),
            ("Shopping", CategoryKind::Expense),
            ("Subscriptions", CategoryKind::Expense),
        ];

        let tx = self.conn.transaction()?;
        for (name, kind) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, kind) VALUES (?1, ?2)",
                params![name, kind.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Accounts ──────────────────────────────────────────────

    pub(crate) fn insert_account(&self, account: &Account) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO accounts (name, account_type, balance, institution, opened_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.name,
                account.account_type.as_str(),
                account.balance.to_string(),
                account.institution,
                account.opened_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn insert_category(&self, category: &Category) -> Result<CategoryId> {
        let parent = category
            .parent_id
            .as_ref()
            .map(db_category_key)
            .transpose()?;
        self.conn
            .execute(
                "INSERT INTO categories (name, kind, parent_id) VALUES (?1, ?2, ?3)",
                params![category.name, category.kind.as_str(), parent],
            )
            .with_context(|| format!("Failed to create category '{}'", category.name))?;
        Ok(CategoryId::from(self.conn.last_insert_rowid()))
    }

    // ── Transactions ──────────────────────────────────────────

    /// Insert a manually entered transaction. Never deduplicated.
    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        insert_row(&self.conn, txn, "")?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, kind = %txn.transaction_type, "transaction added");
        Ok(id)
    }

    /// Insert imported transactions, skipping rows already imported.
    /// Returns the number of rows actually written.
    ///
    /// Identical rows within one batch are told apart by their position
    /// among each other, so two equal purchases on the same day both land
    /// and re-importing the same file still skips both.
    pub(crate) fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        let mut seen: HashMap<String, usize> = HashMap::new();
        for txn in txns {
            let base = content_hash(txn, 0);
            let ordinal = seen.entry(base.clone()).or_insert(0);
            let hash = if *ordinal == 0 {
                base
            } else {
                content_hash(txn, *ordinal)
            };
            *ordinal += 1;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM transactions WHERE import_hash = ?1)",
                params![hash],
                |row| row.get(0),
            )?;
            if exists {
                continue;
            }
            insert_row(&tx, txn, &hash)?;
            count += 1;
        }
        tx.commit()?;
        tracing::info!(inserted = count, skipped = txns.len() - count, "batch import");
        Ok(count)
    }

    pub(crate) fn delete_transaction(&self, id: i64) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        if n == 0 {
            anyhow::bail!("Transaction #{id} not found");
        }
        tracing::info!(id, "transaction deleted");
        Ok(())
    }

    pub(crate) fn transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }
}

impl FinanceStore for Database {
    fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let mut sql = String::from(
            "SELECT id, account_id, category_id, amount, transaction_date, description,
                    payment_method, transaction_type, is_recurring, created_at
             FROM transactions WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(range) = query.range {
            sql.push_str(&format!(
                " AND transaction_date >= ?{} AND transaction_date <= ?{}",
                param_values.len() + 1,
                param_values.len() + 2
            ));
            param_values.push(Box::new(range.start().format("%Y-%m-%d").to_string()));
            param_values.push(Box::new(range.end().format("%Y-%m-%d").to_string()));
        }

        if !query.payment_methods.is_empty() {
            let placeholders = placeholders(param_values.len(), query.payment_methods.len());
            sql.push_str(&format!(" AND payment_method IN ({placeholders})"));
            for method in &query.payment_methods {
                param_values.push(Box::new(method.as_str().to_string()));
            }
        }

        if !query.category_ids.is_empty() {
            let keys: Vec<i64> = query
                .category_ids
                .iter()
                .filter_map(CategoryId::as_i64)
                .collect();
            if keys.len() < query.category_ids.len() {
                tracing::debug!(
                    requested = query.category_ids.len(),
                    usable = keys.len(),
                    "dropping non-numeric category ids from filter"
                );
            }
            if keys.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = placeholders(param_values.len(), keys.len());
            sql.push_str(&format!(" AND category_id IN ({placeholders})"));
            for key in keys {
                param_values.push(Box::new(key));
            }
        }

        if let Some(s) = query.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(
                " AND description LIKE ?{} ESCAPE '\\'",
                param_values.len() + 1
            ));
            param_values.push(Box::new(format!("%{}%", escape_like(s))));
        }

        sql.push_str(" ORDER BY transaction_date DESC, id DESC");

        if let Some(l) = query.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), transaction_from_row)?;
        let txns = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read transactions")?;
        tracing::debug!(rows = txns.len(), "transactions fetched");
        Ok(txns)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, kind, parent_id FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(CategoryId::from(row.get::<_, i64>(0)?)),
                name: row.get(1)?,
                kind: CategoryKind::parse(&row.get::<_, String>(2)?),
                parent_id: row.get::<_, Option<i64>>(3)?.map(CategoryId::from),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, account_type, balance, institution, opened_date
             FROM accounts ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            let balance: String = row.get(3)?;
            let opened: Option<String> = row.get(5)?;
            Ok(Account {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                account_type: AccountType::parse(&row.get::<_, String>(2)?),
                balance: decimal_column(3, &balance)?,
                institution: row.get(4)?,
                opened_date: opened.map(|s| date_column(5, &s)).transpose()?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// Make `%`, `_` and `\` match themselves under `LIKE … ESCAPE '\'`.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn insert_row(conn: &Connection, txn: &Transaction, import_hash: &str) -> Result<()> {
    let category = txn
        .category_id
        .as_ref()
        .map(db_category_key)
        .transpose()?;
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO transactions (account_id, category_id, amount, transaction_date, description,
                                   payment_method, transaction_type, is_recurring, import_hash,
                                   created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            txn.account_id,
            category,
            txn.amount.to_string(),
            txn.transaction_date.format("%Y-%m-%d").to_string(),
            txn.description,
            txn.payment_method.as_str(),
            txn.transaction_type.as_str(),
            txn.is_recurring,
            import_hash,
            txn.created_at,
            now,
        ],
    )
    .with_context(|| format!("Failed to insert transaction '{}'", txn.description))?;
    Ok(())
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount: String = row.get(3)?;
    let date: String = row.get(4)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        account_id: row.get(1)?,
        category_id: row.get::<_, Option<i64>>(2)?.map(CategoryId::from),
        amount: decimal_column(3, &amount)?,
        transaction_date: date_column(4, &date)?,
        description: row.get(5)?,
        payment_method: PaymentMethod::parse(&row.get::<_, String>(6)?),
        transaction_type: TransactionType::parse(&row.get::<_, String>(7)?),
        is_recurring: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Category ids above this layer are strings; SQLite keys are integers.
fn db_category_key(id: &CategoryId) -> Result<i64> {
    id.as_i64()
        .ok_or_else(|| anyhow::anyhow!("Category id '{id}' is not a database key"))
}

fn placeholders(offset: usize, count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", offset + i + 1))
        .collect::<Vec<_>>()
        .join(",")
}

fn decimal_column(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Stable content hash for import deduplication (FNV-1a, 64-bit).
/// FNV-1a over the row's content. `ordinal` counts earlier identical rows
/// in the same batch; the first keeps the plain content hash.
fn content_hash(txn: &Transaction, ordinal: usize) -> String {
    let mut input = format!(
        "{}|{}|{}|{}|{}",
        txn.transaction_date, txn.description, txn.amount, txn.transaction_type, txn.payment_method
    );
    if ordinal > 0 {
        input.push_str(&format!("|#{ordinal}"));
    }
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in input.as_bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests;
