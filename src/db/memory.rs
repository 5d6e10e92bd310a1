use std::cell::RefCell;

use anyhow::Result;

use super::store::{FinanceStore, TransactionQuery};
use crate::models::{Account, Category, Transaction};

/// In-memory `FinanceStore` for tests. Records every query it receives.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) categories: Vec<Category>,
    pub(crate) accounts: Vec<Account>,
    pub(crate) queries: RefCell<Vec<TransactionQuery>>,
}

impl FinanceStore for MemoryStore {
    fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.queries.borrow_mut().push(query.clone());
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.id.cmp(&a.id))
        });
        if let Some(limit) = query.limit {
            out.truncate(limit as usize);
        }
        Ok(out)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }
}
