use anyhow::Result;

use crate::models::{Account, Category, CategoryId, PaymentMethod, Transaction};
use crate::period::DateRange;

/// What the dashboard asks the backend for. Empty lists mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TransactionQuery {
    pub(crate) range: Option<DateRange>,
    pub(crate) payment_methods: Vec<PaymentMethod>,
    pub(crate) category_ids: Vec<CategoryId>,
    pub(crate) search: Option<String>,
    pub(crate) limit: Option<u32>,
}

impl TransactionQuery {
    pub(crate) fn in_range(range: DateRange) -> Self {
        Self {
            range: Some(range),
            ..Self::default()
        }
    }

    /// Same predicate the SQL builds, for stores that filter in memory.
    pub(crate) fn matches(&self, txn: &Transaction) -> bool {
        if let Some(range) = self.range {
            if !range.contains(txn.transaction_date) {
                return false;
            }
        }
        if !self.payment_methods.is_empty() && !self.payment_methods.contains(&txn.payment_method)
        {
            return false;
        }
        if !self.category_ids.is_empty()
            && !txn
                .category_id
                .as_ref()
                .is_some_and(|c| self.category_ids.contains(c))
        {
            return false;
        }
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            // SQLite's LIKE folds ASCII case only.
            if !txn
                .description
                .to_ascii_lowercase()
                .contains(&s.to_ascii_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Read side of the finance backend.
///
/// The dashboard only ever sees this trait, so the SQLite database and the
/// in-memory test store are interchangeable. Transactions come back newest
/// first (date descending, then id descending).
pub(crate) trait FinanceStore {
    fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;
    fn categories(&self) -> Result<Vec<Category>>;
    fn accounts(&self) -> Result<Vec<Account>>;
}
