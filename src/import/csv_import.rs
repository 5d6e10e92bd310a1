use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{Category, PaymentMethod, Transaction, TransactionType};

/// Where each field lives in a CSV row. Only date, description and amount
/// are required; the rest fall back to sign-derived type, no category and
/// cash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub(crate) date: usize,
    pub(crate) description: usize,
    pub(crate) amount: usize,
    pub(crate) kind: Option<usize>,
    pub(crate) category: Option<usize>,
    pub(crate) payment_method: Option<usize>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: 0,
            description: 1,
            amount: 2,
            kind: Some(3),
            category: Some(4),
            payment_method: Some(5),
        }
    }
}

impl ColumnMap {
    /// Map header names (case-insensitive) to columns.
    pub(crate) fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase().replace([' ', '-'], "_");
                names.contains(&h.as_str())
            })
        };

        let date = find(&["date", "transaction_date"]);
        let description = find(&["description", "desc", "memo", "payee"]);
        let amount = find(&["amount", "value"]);

        let (Some(date), Some(description), Some(amount)) = (date, description, amount) else {
            anyhow::bail!(
                "CSV header must name date, description and amount columns (found: {})",
                headers.join(", ")
            );
        };

        Ok(Self {
            date,
            description,
            amount,
            kind: find(&["type", "transaction_type", "kind"]),
            category: find(&["category", "category_id"]),
            payment_method: find(&["payment_method", "method", "payment"]),
        })
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    /// Read the CSV and return the detected header (if any) plus all rows.
    pub(crate) fn read(path: &Path) -> Result<(Option<Vec<String>>, Vec<Vec<String>>)> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            all_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let Some(first_row) = all_rows.first() else {
            anyhow::bail!("CSV file is empty");
        };

        // Headers don't parse as dates or numbers
        let looks_like_header = first_row.iter().all(|field| {
            let trimmed = field.trim();
            parse_decimal(trimmed).is_err() && parse_date(trimmed).is_err()
        });

        if looks_like_header {
            let headers = all_rows.remove(0);
            Ok((Some(headers), all_rows))
        } else {
            Ok((None, all_rows))
        }
    }

    /// Parse rows into transactions. Category cells are resolved against
    /// `categories` by id or name; unknown ones are left uncategorized.
    pub(crate) fn parse(
        rows: &[Vec<String>],
        columns: &ColumnMap,
        categories: &[Category],
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");
            let optional = |idx: Option<usize>| idx.map(cell).unwrap_or("");

            let date_str = cell(columns.date);
            if date_str.is_empty() {
                continue;
            }
            let date = parse_date(date_str)
                .with_context(|| format!("Row {}: failed to parse date '{date_str}'", i + 1))?;

            let raw_amount = parse_decimal(cell(columns.amount))
                .with_context(|| format!("Row {}: failed to parse amount", i + 1))?;

            let kind = match optional(columns.kind) {
                "" if raw_amount < Decimal::ZERO => TransactionType::Expense,
                "" => TransactionType::Income,
                explicit => TransactionType::parse(explicit),
            };

            let description = cell(columns.description).to_string();
            let mut txn = Transaction::new(date, description, raw_amount.abs(), kind);
            txn.account_id = account_id;

            match optional(columns.payment_method) {
                "" => {}
                method => txn.payment_method = PaymentMethod::parse(method),
            }

            match optional(columns.category) {
                "" => {}
                name => match Category::resolve(categories, name) {
                    Some(category) => txn.category_id = category.id.clone(),
                    None => {
                        tracing::debug!(row = i + 1, category = name, "unknown category");
                    }
                },
            }

            transactions.push(txn);
        }

        Ok(transactions)
    }
}

/// Read and parse a CSV file in one go, mapping columns from its header
/// when it has one.
pub(crate) fn import_file(
    path: &Path,
    categories: &[Category],
    account_id: Option<i64>,
) -> Result<Vec<Transaction>> {
    let (headers, rows) = CsvImporter::read(path)?;
    let columns = match headers {
        Some(h) => ColumnMap::from_headers(&h)?,
        None => ColumnMap::default(),
    };
    let txns = CsvImporter::parse(&rows, &columns, categories, account_id)?;
    tracing::info!(path = %path.display(), rows = rows.len(), parsed = txns.len(), "csv parsed");
    Ok(txns)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    for fmt in &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%m/%d/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    anyhow::bail!("Could not parse date: {}", s)
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ',', '"'], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        anyhow::bail!("Amount is empty");
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{s}' as decimal"))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
