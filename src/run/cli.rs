use anyhow::{Context, Result};
use chrono::Local;
use std::io::Write;
use std::path::Path;

use crate::chart::daily_by_payment_method;
use crate::config::Config;
use crate::dashboard::{load_dashboard, load_transactions, DashboardData, TransactionFilters};
use crate::db::{Database, FinanceStore, TransactionQuery};
use crate::models::{Category, CategoryKind, PaymentMethod};
use crate::period::{parse_date, DateRange, ReportingPeriod};
use crate::ui::commands::shellexpand;
use crate::ui::util::{format_amount, format_signed, percent_of, truncate};

pub(crate) fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(args, db, config, &mut out)
}

/// Dispatch one CLI invocation. `args` excludes the program name and
/// global flags.
fn run_command(args: &[String], db: &mut Database, config: &Config, out: &mut dyn Write) -> Result<()> {
    let Some(command) = args.first() else {
        print_usage(out)?;
        return Ok(());
    };
    let rest = &args[1..];
    tracing::debug!(command = %command, args = ?rest, "cli command");

    match command.as_str() {
        "summary" | "s" => cli_summary(rest, db, config, out),
        "flow" => cli_flow(rest, db, config, out),
        "transactions" | "txns" => cli_transactions(rest, db, out),
        "chart" => cli_chart(rest, db, out),
        "import" => cli_import(rest, db, out),
        "export" => cli_export(rest, db, out),
        "categories" => cli_categories(db, out),
        "accounts" => cli_accounts(db, out),
        "add-category" => cli_add_category(rest, db, out),
        "--help" | "-h" | "help" => print_usage(out),
        "--version" | "-V" | "version" => {
            writeln!(out, "flowdash {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        other => {
            print_usage(out)?;
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage(out: &mut dyn Write) -> Result<()> {
    let usage = "\
FlowDash - where this month's money went

Usage: flowdash [--verbose] [command]

Commands:
  (none)                        Launch interactive dashboard
  summary [YYYY-MM]             Income, expenses and savings for a month
  flow [YYYY-MM]                Money-flow edges for a month
  transactions                  List transactions (default: month to date)
    --from <YYYY-MM-DD>         Range start
    --to <YYYY-MM-DD>           Range end
    --method <m1,m2>            Payment methods (cash, credit_card, ...)
    --category <c1,c2>          Category names or ids
    --search <text>             Description contains text
  chart                         Daily expenses by payment method
    --from / --to               Range (default: month to date)
  import <file.csv>             Import a CSV file
    --account <name>            Account to book into (default: first account)
  export [path]                 Export a month to CSV
    --month <YYYY-MM>           Month to export (default: current)
  categories                    List categories
  accounts                      List accounts
  add-category <name> [kind]    Create a category (expense, income, investment)
  --help, -h                    Show this help
  --version, -V                 Show version

Environment:
  FLOWDASH_HOME                 Data directory
  FLOWDASH_DB                   Database file
  FLOWDASH_RECENT               Recent transactions on the dashboard
  RUST_LOG                      Log filter (overrides --verbose)
";
    out.write_all(usage.as_bytes())?;
    Ok(())
}

// ── Argument helpers ─────────────────────────────────────────

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            return Some(arg);
        }
    }
    None
}

fn period_arg(args: &[String]) -> Result<ReportingPeriod> {
    match positional(args) {
        Some(raw) => Ok(ReportingPeriod::parse(raw)?),
        None => Ok(ReportingPeriod::current()),
    }
}

fn range_args(args: &[String]) -> Result<DateRange> {
    let mut range = DateRange::month_to_date(Local::now().date_naive());
    if let Some(raw) = flag_value(args, "--from") {
        let start = parse_date(raw)?;
        // A start after today keeps the range non-empty.
        range = DateRange::new(start, range.end().max(start))?;
    }
    if let Some(raw) = flag_value(args, "--to") {
        range = range.with_end(parse_date(raw)?)?;
    }
    Ok(range)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

// ── Reports ──────────────────────────────────────────────────

fn load_period(
    args: &[String],
    db: &Database,
    config: &Config,
) -> Result<DashboardData> {
    let period = period_arg(args)?;
    load_dashboard(db, period, config.recent_limit, &config.labels)
}

fn cli_summary(args: &[String], db: &Database, config: &Config, out: &mut dyn Write) -> Result<()> {
    let data = load_period(args, db, config)?;
    let summary = &data.summary;

    writeln!(out, "FlowDash - {}", data.period.label())?;
    writeln!(out, "{}", "─".repeat(40))?;
    writeln!(out, "  Income:     {:>14}", format_amount(summary.total_income))?;
    writeln!(out, "  Expenses:   {:>14}", format_amount(summary.total_expenses))?;
    writeln!(out, "  Savings:    {:>14}", format_amount(summary.total_savings))?;
    if let Some(rate) = percent_of(summary.total_savings, summary.total_income) {
        writeln!(out, "  Saved:      {:>14}", format!("{rate}%"))?;
    }
    writeln!(out, "  Total Txns: {:>14}", data.transaction_count)?;

    if !data.recent.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recent:")?;
        for txn in &data.recent {
            writeln!(
                out,
                "  {}  {:<30} {:>14}",
                txn.transaction_date,
                truncate(&txn.description, 30),
                format_signed(txn)
            )?;
        }
    }
    Ok(())
}

fn cli_flow(args: &[String], db: &Database, config: &Config, out: &mut dyn Write) -> Result<()> {
    let data = load_period(args, db, config)?;
    let graph = &data.summary.flow_graph;

    if graph.is_empty() {
        writeln!(out, "No income or expenses in {}", data.period.label())?;
        return Ok(());
    }

    writeln!(out, "Money flow - {}", data.period.label())?;
    let name = |id: &str| graph.node(id).map_or_else(|| id.to_string(), |n| n.display_name.clone());
    for edge in &graph.edges {
        let pct = percent_of(edge.weight, data.summary.total_income)
            .map(|p| format!(" ({p}%)"))
            .unwrap_or_default();
        writeln!(
            out,
            "  {} -> {}: {}{pct}",
            name(&edge.source),
            name(&edge.target),
            format_amount(edge.weight)
        )?;
    }
    Ok(())
}

fn cli_transactions(args: &[String], db: &Database, out: &mut dyn Write) -> Result<()> {
    let mut filters = TransactionFilters {
        range: range_args(args)?,
        ..TransactionFilters::default()
    };
    if let Some(raw) = flag_value(args, "--method") {
        for method in split_list(raw) {
            filters.toggle_payment_method(PaymentMethod::parse(method));
        }
    }
    if let Some(raw) = flag_value(args, "--category") {
        let categories = db.categories()?;
        for token in split_list(raw) {
            let category = Category::resolve(&categories, token)
                .ok_or_else(|| anyhow::anyhow!("Category '{token}' not found"))?;
            if let Some(id) = category.id.clone() {
                filters.toggle_category(id);
            }
        }
    }
    filters.search = flag_value(args, "--search").map(str::to_string);

    let view = load_transactions(db, &filters)?;
    if view.transactions.is_empty() {
        writeln!(out, "No transactions between {}", filters.range)?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<10}  {:<30} {:<16} {:<12} {:>14}",
        "Date", "Description", "Category", "Method", "Amount"
    )?;
    writeln!(out, "{}", "─".repeat(86))?;
    for txn in &view.transactions {
        let category = txn
            .category_id
            .as_ref()
            .and_then(|id| view.category_names.get(id))
            .map_or("", String::as_str);
        writeln!(
            out,
            "{:<10}  {:<30} {:<16} {:<12} {:>14}",
            txn.transaction_date,
            truncate(&txn.description, 30),
            truncate(category, 16),
            txn.payment_method.label(),
            format_signed(txn)
        )?;
    }
    let net = view
        .transactions
        .iter()
        .try_fold(rust_decimal::Decimal::ZERO, |acc, t| acc.checked_add(t.signed_amount()))
        .context("Net total of the listed transactions overflowed")?;
    writeln!(
        out,
        "{} transactions, net {}",
        view.transactions.len(),
        format_amount(net)
    )?;
    Ok(())
}

fn cli_chart(args: &[String], db: &Database, out: &mut dyn Write) -> Result<()> {
    let range = range_args(args)?;
    let txns = db.transactions(&TransactionQuery::in_range(range))?;
    let chart = daily_by_payment_method(&txns, range);

    if chart.is_empty() {
        writeln!(out, "No expenses between {range}")?;
        return Ok(());
    }

    write!(out, "{:<10}", "Date")?;
    for series in &chart.series {
        write!(out, " {:>12}", series.method.label())?;
    }
    writeln!(out, " {:>12}", "Total")?;

    for (i, day) in chart.days.iter().enumerate() {
        let total = chart.day_total(i);
        if total.is_zero() {
            continue;
        }
        write!(out, "{day}")?;
        for series in &chart.series {
            write!(out, " {:>12}", format_amount(series.values[i]))?;
        }
        writeln!(out, " {:>12}", format_amount(total))?;
    }

    write!(out, "{:<10}", "Total")?;
    for series in &chart.series {
        write!(out, " {:>12}", format_amount(chart.series_total(&series.method)))?;
    }
    let grand = (0..chart.days.len())
        .map(|i| chart.day_total(i))
        .fold(rust_decimal::Decimal::ZERO, rust_decimal::Decimal::saturating_add);
    writeln!(out, " {:>12}", format_amount(grand))?;
    Ok(())
}

// ── Data ─────────────────────────────────────────────────────

fn cli_import(args: &[String], db: &mut Database, out: &mut dyn Write) -> Result<()> {
    let Some(file_path) = positional(args) else {
        anyhow::bail!("Usage: flowdash import <file.csv> [--account <name>]");
    };
    let expanded = shellexpand(file_path);
    let path = Path::new(&expanded);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let accounts = db.accounts()?;
    let account_id = match flag_value(args, "--account") {
        Some(name) => accounts
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.id)
            .ok_or_else(|| anyhow::anyhow!("Account '{name}' not found"))?,
        None => accounts
            .first()
            .and_then(|a| a.id)
            .context("No accounts found. Create one first")?,
    };

    let categories = db.categories()?;
    let txns = crate::import::import_file(path, &categories, Some(account_id))?;
    writeln!(out, "Parsed {} transactions", txns.len())?;

    let count = db.insert_transactions_batch(&txns)?;
    writeln!(
        out,
        "Imported {count} new transactions ({} duplicates skipped)",
        txns.len() - count
    )?;
    Ok(())
}

fn cli_export(args: &[String], db: &Database, out: &mut dyn Write) -> Result<()> {
    let period = match flag_value(args, "--month") {
        Some(raw) => ReportingPeriod::parse(raw)?,
        None => ReportingPeriod::current(),
    };
    let output_path = positional(args)
        .map(shellexpand)
        .unwrap_or_else(|| shellexpand(&format!("~/flowdash-export-{period}.csv")));

    let txns = db.transactions(&TransactionQuery::in_range(period.range()))?;
    let names = crate::models::category_names(&db.categories()?);
    let count = crate::import::export_to_path(Path::new(&output_path), &txns, &names)?;
    if count == 0 {
        writeln!(out, "No transactions for {}", period.label())?;
    } else {
        writeln!(out, "Exported {count} transactions to {output_path}")?;
    }
    Ok(())
}

fn cli_categories(db: &Database, out: &mut dyn Write) -> Result<()> {
    let categories = db.categories()?;
    writeln!(out, "{:<4} {:<24} Kind", "ID", "Name")?;
    writeln!(out, "{}", "─".repeat(40))?;
    for cat in &categories {
        let id = cat.id.as_ref().map_or(String::new(), ToString::to_string);
        writeln!(out, "{id:<4} {:<24} {}", cat.name, cat.kind.as_str())?;
    }
    Ok(())
}

fn cli_accounts(db: &Database, out: &mut dyn Write) -> Result<()> {
    let accounts = db.accounts()?;
    if accounts.is_empty() {
        writeln!(out, "No accounts")?;
        return Ok(());
    }

    writeln!(out, "{:<4} {:<20} {:<15} Institution", "ID", "Name", "Type")?;
    writeln!(out, "{}", "─".repeat(55))?;
    for acct in &accounts {
        writeln!(
            out,
            "{:<4} {:<20} {:<15} {}",
            acct.id.unwrap_or(0),
            acct.name,
            acct.account_type,
            acct.institution,
        )?;
    }
    writeln!(out, "{} transactions stored", db.transaction_count()?)?;
    Ok(())
}

fn cli_add_category(args: &[String], db: &Database, out: &mut dyn Write) -> Result<()> {
    let Some((last, init)) = args.split_last() else {
        anyhow::bail!("Usage: flowdash add-category <name> [expense|income|investment]");
    };
    let (name, kind) = match last.to_lowercase().as_str() {
        "expense" | "income" | "investment" if !init.is_empty() => {
            (init.join(" "), CategoryKind::parse(last))
        }
        _ => (args.join(" "), CategoryKind::Expense),
    };

    if Category::find_by_name(&db.categories()?, &name).is_some() {
        anyhow::bail!("Category '{name}' already exists");
    }
    let id = db.insert_category(&Category::new(name.clone(), kind))?;
    writeln!(out, "Created category '{name}' ({}) with id {id}", kind.as_str())?;
    Ok(())
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
