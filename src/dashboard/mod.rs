//! Loaders that turn store queries into what each screen shows.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::chart::{daily_by_payment_method, PaymentMethodChart};
use crate::db::{FinanceStore, TransactionQuery};
use crate::models::{category_names, CategoryId, PaymentMethod, Transaction};
use crate::period::{DateRange, ReportingPeriod};
use crate::summary::{summarize_with_labels, FlowLabels, Summary};

#[derive(Debug, Clone)]
pub(crate) struct DashboardData {
    pub(crate) period: ReportingPeriod,
    pub(crate) summary: Summary,
    /// Newest first, at most `recent_limit` entries.
    pub(crate) recent: Vec<Transaction>,
    /// Transactions in the period, of any type.
    pub(crate) transaction_count: usize,
    pub(crate) category_names: HashMap<CategoryId, String>,
}

pub(crate) fn load_dashboard(
    store: &dyn FinanceStore,
    period: ReportingPeriod,
    recent_limit: usize,
    labels: &FlowLabels,
) -> Result<DashboardData> {
    let txns = store.transactions(&TransactionQuery::in_range(period.range()))?;
    let names = category_names(&store.categories()?);
    let summary = summarize_with_labels(&txns, &names, labels)
        .with_context(|| format!("Failed to summarize {period}"))?;

    tracing::debug!(
        %period,
        transactions = txns.len(),
        income = %summary.total_income,
        expenses = %summary.total_expenses,
        "dashboard loaded"
    );

    let transaction_count = txns.len();
    let recent = txns.into_iter().take(recent_limit).collect();
    Ok(DashboardData {
        period,
        summary,
        recent,
        transaction_count,
        category_names: names,
    })
}

/// Filters on the transactions screen. Empty lists mean "all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransactionFilters {
    pub(crate) range: DateRange,
    pub(crate) payment_methods: Vec<PaymentMethod>,
    pub(crate) category_ids: Vec<CategoryId>,
    pub(crate) search: Option<String>,
}

impl Default for TransactionFilters {
    fn default() -> Self {
        Self::month_to_date(chrono::Local::now().date_naive())
    }
}

impl TransactionFilters {
    pub(crate) fn month_to_date(today: NaiveDate) -> Self {
        Self {
            range: DateRange::month_to_date(today),
            payment_methods: Vec::new(),
            category_ids: Vec::new(),
            search: None,
        }
    }

    /// Add the method if absent, remove it if present.
    pub(crate) fn toggle_payment_method(&mut self, method: PaymentMethod) {
        toggle(&mut self.payment_methods, method);
    }

    pub(crate) fn toggle_category(&mut self, id: CategoryId) {
        toggle(&mut self.category_ids, id);
    }

    /// Drop method, category and search filters. The date range stays.
    pub(crate) fn clear(&mut self) {
        self.payment_methods.clear();
        self.category_ids.clear();
        self.search = None;
    }

    pub(crate) fn is_filtered(&self) -> bool {
        !self.payment_methods.is_empty()
            || !self.category_ids.is_empty()
            || self.search.is_some()
    }

    pub(crate) fn to_query(&self) -> TransactionQuery {
        TransactionQuery {
            range: Some(self.range),
            payment_methods: self.payment_methods.clone(),
            category_ids: self.category_ids.clone(),
            search: self.search.clone(),
            limit: None,
        }
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if let Some(pos) = items.iter().position(|i| *i == item) {
        items.remove(pos);
    } else {
        items.push(item);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TransactionsView {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) chart: PaymentMethodChart,
    pub(crate) category_names: HashMap<CategoryId, String>,
}

pub(crate) fn load_transactions(
    store: &dyn FinanceStore,
    filters: &TransactionFilters,
) -> Result<TransactionsView> {
    let transactions = store.transactions(&filters.to_query())?;
    let names = category_names(&store.categories()?);
    let chart = daily_by_payment_method(&transactions, filters.range);
    tracing::debug!(
        range = %filters.range,
        rows = transactions.len(),
        filtered = filters.is_filtered(),
        "transactions loaded"
    );
    Ok(TransactionsView {
        transactions,
        chart,
        category_names: names,
    })
}

#[cfg(test)]
mod tests;
