pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    account_type TEXT NOT NULL DEFAULT 'checking',
    balance      TEXT NOT NULL DEFAULT '0',
    institution  TEXT NOT NULL DEFAULT '',
    opened_date  TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE,
    kind      TEXT NOT NULL DEFAULT 'expense',
    parent_id INTEGER REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id       INTEGER REFERENCES accounts(id),
    category_id      INTEGER REFERENCES categories(id),
    amount           TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    payment_method   TEXT NOT NULL DEFAULT 'cash',
    transaction_type TEXT NOT NULL,
    is_recurring     BOOLEAN NOT NULL DEFAULT 0,
    import_hash      TEXT NOT NULL DEFAULT '',
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
CREATE INDEX IF NOT EXISTS idx_transactions_method ON transactions(payment_method);
CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_hash_unique ON transactions(import_hash) WHERE import_hash != '';
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
