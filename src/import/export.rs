use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::models::{CategoryId, Transaction};

const HEADER: [&str; 6] = [
    "date",
    "description",
    "amount",
    "type",
    "category",
    "payment_method",
];

/// Write transactions as CSV in the same column layout the importer reads.
/// Categories are written by name so the file survives a fresh database.
pub(crate) fn write_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for txn in transactions {
        let category = txn
            .category_id
            .as_ref()
            .and_then(|id| category_names.get(id))
            .map(String::as_str)
            .unwrap_or("");
        wtr.write_record([
            txn.transaction_date.format("%Y-%m-%d").to_string().as_str(),
            txn.description.as_str(),
            txn.amount.to_string().as_str(),
            txn.transaction_type.as_str(),
            category,
            txn.payment_method.as_str(),
        ])?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(transactions.len())
}

pub(crate) fn export_to_path(
    path: &Path,
    transactions: &[Transaction],
    category_names: &HashMap<CategoryId, String>,
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let count = write_csv(file, transactions, category_names)?;
    tracing::info!(path = %path.display(), count, "transactions exported");
    Ok(count)
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
