use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;

use crate::chart::PaymentMethodChart;
use crate::dashboard::{load_dashboard, load_transactions, DashboardData, TransactionFilters};
use crate::db::{Database, FinanceStore};
use crate::models::*;
use crate::period::{DateRange, ReportingPeriod};
use crate::summary::FlowLabels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Dashboard, Self::Transactions]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: i64, description: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) today: NaiveDate,
    pub(crate) period: ReportingPeriod,
    pub(crate) recent_limit: usize,
    pub(crate) labels: FlowLabels,

    // Dashboard
    pub(crate) dashboard: Option<DashboardData>,
    pub(crate) dashboard_error: Option<String>,

    // Transactions
    pub(crate) filters: TransactionFilters,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) chart: Option<PaymentMethodChart>,
    pub(crate) category_names: HashMap<CategoryId, String>,
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,

    pub(crate) categories: Vec<Category>,
    /// Account that manual entries and imports are booked to.
    pub(crate) account_id: Option<i64>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(recent_limit: usize, labels: FlowLabels) -> Self {
        let today = Local::now().date_naive();

        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            today,
            period: ReportingPeriod::containing(today),
            recent_limit,
            labels,

            dashboard: None,
            dashboard_error: None,

            filters: TransactionFilters::month_to_date(today),
            transactions: Vec::new(),
            chart: None,
            category_names: HashMap::new(),
            transaction_index: 0,
            transaction_scroll: 0,

            categories: Vec::new(),
            account_id: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Switch the reporting month. The transactions range follows: the
    /// current month runs to today, any other month is shown whole.
    pub(crate) fn set_period(&mut self, period: ReportingPeriod) {
        self.period = period;
        self.filters.range = if period.range().contains(self.today) {
            DateRange::month_to_date(self.today)
        } else {
            period.range()
        };
        self.transaction_index = 0;
        self.transaction_scroll = 0;
    }

    /// Reload the dashboard. A summarize failure (bad stored amount) is
    /// kept for display instead of aborting the UI.
    pub(crate) fn refresh_dashboard(&mut self, store: &dyn FinanceStore) -> Result<()> {
        match load_dashboard(store, self.period, self.recent_limit, &self.labels) {
            Ok(data) => {
                self.dashboard = Some(data);
                self.dashboard_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "dashboard refresh failed");
                self.dashboard = None;
                self.dashboard_error = Some(format!("{e:#}"));
            }
        }
        Ok(())
    }

    pub(crate) fn refresh_transactions(&mut self, store: &dyn FinanceStore) -> Result<()> {
        self.filters.search = if self.search_input.is_empty() {
            None
        } else {
            Some(self.search_input.clone())
        };
        let view = load_transactions(store, &self.filters)?;
        self.transactions = view.transactions;
        self.chart = Some(view.chart);
        self.category_names = view.category_names;
        if self.transaction_index >= self.transactions.len() {
            self.transaction_index = self.transactions.len().saturating_sub(1);
        }
        if self.transaction_scroll > self.transaction_index {
            self.transaction_scroll = self.transaction_index;
        }
        Ok(())
    }

    pub(crate) fn refresh_categories(&mut self, store: &dyn FinanceStore) -> Result<()> {
        self.categories = store.categories()?;
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, db: &Database) -> Result<()> {
        self.refresh_categories(db)?;
        if self.account_id.is_none() {
            self.account_id = db.accounts()?.first().and_then(|a| a.id);
        }
        self.refresh_dashboard(db)?;
        self.refresh_transactions(db)?;
        Ok(())
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.transaction_index)
    }

    pub(crate) fn category_name(&self, id: Option<&CategoryId>) -> Option<&str> {
        id.and_then(|id| self.category_names.get(id))
            .map(String::as_str)
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}
