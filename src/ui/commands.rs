use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use std::str::FromStr;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::db::{Database, FinanceStore, TransactionQuery};
use crate::models::{
    category_names, Category, CategoryKind, PaymentMethod, Transaction, TransactionType,
};
use crate::period::{parse_date, PeriodError, ReportingPeriod};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit FlowDash", cmd_quit, r);
    register_command!("quit", "Quit FlowDash", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!("from", "Set range start (e.g. :from 2024-01-10)", cmd_from, r);
    register_command!("to", "Set range end (e.g. :to 2024-01-20)", cmd_to, r);
    register_command!(
        "method",
        "Toggle payment method filter (e.g. :method cash,credit_card)",
        cmd_method,
        r
    );
    register_command!(
        "category",
        "Toggle category filter (e.g. :category Groceries)",
        cmd_category,
        r
    );
    register_command!(
        "search",
        "Search transactions (e.g. :search coffee)",
        cmd_search,
        r
    );
    register_command!("s", "Search transactions (e.g. :s coffee)", cmd_search, r);
    register_command!(
        "clear",
        "Clear method, category and search filters",
        cmd_clear,
        r
    );
    register_command!(
        "add-txn",
        "Add transaction (e.g. :add-txn 2024-01-15 Coffee -4.50 @cash)",
        cmd_add_txn,
        r
    );
    register_command!(
        "delete-txn",
        "Delete selected transaction",
        cmd_delete_txn,
        r
    );
    register_command!(
        "import",
        "Import CSV file (e.g. :import ~/bank.csv)",
        cmd_import,
        r
    );
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/may.csv)",
        cmd_export,
        r
    );
    register_command!(
        "new-category",
        "Create category (e.g. :new-category Pets expense)",
        cmd_new_category,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        tracing::debug!(command = cmd_name, args, "running command");
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_dashboard(db)
}

fn cmd_transactions(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(db)
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

// ── Period and range ──────────────────────────────────────────

fn cmd_month(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        let current = ReportingPeriod::containing(app.today);
        return switch_period(app, db, current);
    }

    // Accept "2024-01", "2024-1", or a bare month number in the shown year
    let period = if args.len() <= 2 {
        args.parse()
            .ok()
            .and_then(|month| ReportingPeriod::from_ym(app.period.year(), month))
            .ok_or_else(|| PeriodError::InvalidMonth(args.to_string()))
    } else {
        ReportingPeriod::parse(args)
    };

    match period {
        Ok(period) => switch_period(app, db, period),
        Err(e) => {
            app.set_status(format!("{e}. Use YYYY-MM (e.g. 2024-01)"));
            Ok(())
        }
    }
}

fn cmd_next_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let next = app.period.next();
    switch_period(app, db, next)
}

fn cmd_prev_month(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let prev = app.period.prev();
    switch_period(app, db, prev)
}

fn switch_period(app: &mut App, db: &mut Database, period: ReportingPeriod) -> anyhow::Result<()> {
    app.set_period(period);
    app.refresh_dashboard(db)?;
    app.refresh_transactions(db)?;
    app.set_status(format!("Month: {}", period.label()));
    Ok(())
}

fn cmd_from(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_range_bound(args, app, db, true)
}

fn cmd_to(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    set_range_bound(args, app, db, false)
}

fn set_range_bound(args: &str, app: &mut App, db: &mut Database, start: bool) -> anyhow::Result<()> {
    let date = match parse_date(args) {
        Ok(d) => d,
        Err(e) => {
            app.set_status(format!("{e}. Use YYYY-MM-DD"));
            return Ok(());
        }
    };
    let range = if start {
        app.filters.range.with_start(date)
    } else {
        app.filters.range.with_end(date)
    };
    match range {
        Ok(range) => {
            app.filters.range = range;
            app.screen = Screen::Transactions;
            app.transaction_index = 0;
            app.transaction_scroll = 0;
            app.refresh_transactions(db)?;
            app.set_status(format!("Range: {range}"));
        }
        Err(e) => app.set_status(e.to_string()),
    }
    Ok(())
}

// ── Filters ───────────────────────────────────────────────────

fn cmd_method(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        let names: Vec<&str> = PaymentMethod::charted().iter().map(|m| m.as_str()).collect();
        app.set_status(format!("Usage: :method <name>[,name]. Methods: {}", names.join(", ")));
        return Ok(());
    }

    for token in args.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        app.filters.toggle_payment_method(PaymentMethod::parse(token));
    }
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.refresh_transactions(db)?;

    let active: Vec<&str> = app.filters.payment_methods.iter().map(|m| m.label()).collect();
    app.set_status(if active.is_empty() {
        "Payment method filter cleared".to_string()
    } else {
        format!("Methods: {}", active.join(", "))
    });
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :category <name or id>");
        return Ok(());
    }

    let Some(id) = Category::resolve(&app.categories, args).and_then(|c| c.id.clone()) else {
        let names: Vec<&str> = app.categories.iter().map(|c| c.name.as_str()).collect();
        app.set_status(format!(
            "Category '{args}' not found. Available: {}",
            names.join(", ")
        ));
        return Ok(());
    };

    app.filters.toggle_category(id);
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.refresh_transactions(db)?;

    let names = category_names(&app.categories);
    let active: Vec<&str> = app
        .filters
        .category_ids
        .iter()
        .filter_map(|id| names.get(id).map(String::as_str))
        .collect();
    app.set_status(if active.is_empty() {
        "Category filter cleared".to_string()
    } else {
        format!("Categories: {}", active.join(", "))
    });
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.refresh_transactions(db)?;

    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("Searching: {args}"));
    }

    Ok(())
}

fn cmd_clear(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.filters.clear();
    app.search_input.clear();
    app.transaction_index = 0;
    app.transaction_scroll = 0;
    app.refresh_transactions(db)?;
    app.set_status("Filters cleared");
    Ok(())
}

// ── Editing ───────────────────────────────────────────────────

fn cmd_add_txn(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    const USAGE: &str = "Usage: :add-txn <date> <description> <amount> [@method]";

    let mut tokens: Vec<&str> = args.split_whitespace().collect();
    let method = match tokens.last() {
        Some(t) if t.starts_with('@') => {
            let m = PaymentMethod::parse(&t[1..]);
            tokens.pop();
            Some(m)
        }
        _ => None,
    };
    if tokens.len() < 3 {
        app.set_status(USAGE);
        return Ok(());
    }

    let date = match parse_date(tokens[0]) {
        Ok(d) => d,
        Err(e) => {
            app.set_status(format!("{e}. {USAGE}"));
            return Ok(());
        }
    };
    let amount_str = tokens[tokens.len() - 1];
    let amount = match Decimal::from_str(amount_str) {
        Ok(a) => a,
        Err(_) => {
            app.set_status(format!("Invalid amount: {amount_str}"));
            return Ok(());
        }
    };
    let description = tokens[1..tokens.len() - 1].join(" ");

    // Negative amounts are spending, positive ones income
    let kind = if amount < Decimal::ZERO {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };
    let mut txn = Transaction::new(date, description.clone(), amount.abs(), kind);
    txn.account_id = app.account_id;
    if let Some(m) = method {
        txn.payment_method = m;
    }

    db.insert_transaction(&txn)?;
    app.refresh_dashboard(db)?;
    app.refresh_transactions(db)?;
    app.set_status(format!(
        "Added {}: {description} {}",
        txn.transaction_type, txn.amount
    ));
    Ok(())
}

fn cmd_delete_txn(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if let Some(txn) = app.selected_transaction() {
        if let Some(id) = txn.id {
            let desc = txn.description.clone();
            app.confirm_message = format!("Delete '{desc}'?");
            app.pending_action = Some(PendingAction::DeleteTransaction {
                id,
                description: desc,
            });
            app.input_mode = InputMode::Confirm;
        }
    }

    Ok(())
}

fn cmd_new_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :new-category <name> [expense|income|investment]");
        return Ok(());
    }

    let is_kind = |s: &str| matches!(s.to_lowercase().as_str(), "expense" | "income" | "investment");
    let (name, kind) = match args.rsplit_once(' ') {
        Some((name, kind)) if is_kind(kind) => (name.trim(), CategoryKind::parse(kind)),
        _ => (args, CategoryKind::Expense),
    };

    if Category::find_by_name(&app.categories, name).is_some() {
        app.set_status(format!("Category '{name}' already exists"));
        return Ok(());
    }

    db.insert_category(&Category::new(name.to_string(), kind))?;
    app.refresh_categories(db)?;
    app.set_status(format!("Created {} category: {name}", kind.as_str()));
    Ok(())
}

// ── Files ─────────────────────────────────────────────────────

fn cmd_import(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }

    let path = shellexpand(args);
    let path = Path::new(&path);
    if !path.exists() {
        app.set_status(format!("File not found: {}", path.display()));
        return Ok(());
    }

    let txns = match crate::import::import_file(path, &app.categories, app.account_id) {
        Ok(t) => t,
        Err(e) => {
            app.set_status(format!("Import failed: {e:#}"));
            return Ok(());
        }
    };
    let count = db.insert_transactions_batch(&txns)?;
    app.refresh_dashboard(db)?;
    app.refresh_transactions(db)?;
    app.set_status(format!(
        "Imported {count} new transactions ({} duplicates skipped)",
        txns.len() - count
    ));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/flowdash-export-{}.csv", app.period)
    } else {
        shellexpand(args)
    };

    let txns = db.transactions(&TransactionQuery::in_range(app.period.range()))?;
    let names = category_names(&app.categories);
    let count = crate::import::export_to_path(Path::new(&path), &txns, &names)?;
    if count == 0 {
        app.set_status(format!("No transactions in {}; wrote header only", app.period.label()));
    } else {
        app.set_status(format!("Exported {count} transactions to {path}"));
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
