//! Daily expenses split by payment method.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{PaymentMethod, Transaction};
use crate::period::DateRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub method: PaymentMethod,
    /// One value per entry of `PaymentMethodChart::days`.
    pub values: Vec<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodChart {
    pub days: Vec<NaiveDate>,
    pub series: Vec<ChartSeries>,
}

impl PaymentMethodChart {
    /// All methods combined for the day at `index`.
    pub fn day_total(&self, index: usize) -> Decimal {
        self.series
            .iter()
            .filter_map(|s| s.values.get(index))
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }

    pub fn series_total(&self, method: &PaymentMethod) -> Decimal {
        self.series
            .iter()
            .find(|s| &s.method == method)
            .map(|s| s.values.iter().fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v)))
            .unwrap_or(Decimal::ZERO)
    }

    /// True when no charted expense fell inside the range.
    pub fn is_empty(&self) -> bool {
        self.series
            .iter()
            .all(|s| s.values.iter().all(|v| v.is_zero()))
    }

    pub fn max_day_total(&self) -> Decimal {
        (0..self.days.len())
            .map(|i| self.day_total(i))
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Build the per-day, per-method expense chart for `range`.
///
/// Every day of the range gets a column even when nothing was spent.
/// Sums saturate at `Decimal::MAX`.
/// Income, other transaction types, dates outside the range and methods
/// without a series are skipped.
pub fn daily_by_payment_method(transactions: &[Transaction], range: DateRange) -> PaymentMethodChart {
    let days: Vec<NaiveDate> = range.days().collect();
    let mut series: Vec<ChartSeries> = PaymentMethod::charted()
        .iter()
        .map(|method| ChartSeries {
            method: method.clone(),
            values: vec![Decimal::ZERO; days.len()],
        })
        .collect();

    let mut skipped = 0usize;
    for txn in transactions.iter().filter(|t| t.is_expense()) {
        if !range.contains(txn.transaction_date) {
            skipped += 1;
            continue;
        }
        let day = (txn.transaction_date - range.start()).num_days() as usize;
        match series.iter_mut().find(|s| s.method == txn.payment_method) {
            Some(s) => s.values[day] = s.values[day].saturating_add(txn.amount),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "expenses left out of the payment-method chart");
    }

    PaymentMethodChart { days, series }
}
