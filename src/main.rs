mod chart;
mod config;
mod dashboard;
mod db;
mod import;
mod models;
mod period;
mod run;
mod summary;
mod ui;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    let config = Config::load()?;
    let tui = args.is_empty();

    init_logging(&config, verbose, tui)?;

    let mut db = db::Database::open(&config.db_path)?;
    ensure_default_account(&db)?;

    if tui {
        run::as_tui(&mut db, &config)
    } else {
        run::as_cli(&args, &mut db, &config)
    }
}

/// Remove every `names` flag from `args` unless it is the value of the
/// option before it, as in `--search -v`.
fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    let mut found = false;
    let mut kept: Vec<String> = Vec::with_capacity(args.len());
    for arg in args.drain(..) {
        let is_value = kept.last().is_some_and(|prev| prev.starts_with("--"));
        if names.contains(&arg.as_str()) && !is_value {
            found = true;
        } else {
            kept.push(arg);
        }
    }
    *args = kept;
    found
}

/// `RUST_LOG` wins, then `--verbose`, then `info` for the dashboard and
/// `warn` for one-shot commands. The dashboard owns the terminal, so its
/// logs go to the log file instead of stderr.
fn init_logging(config: &Config, verbose: bool, tui: bool) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else if tui {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    if tui {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)
            .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

fn ensure_default_account(db: &db::Database) -> Result<()> {
    if db::FinanceStore::accounts(db)?.is_empty() {
        let account = models::Account::new(
            "Default".into(),
            models::AccountType::Checking,
            String::new(),
        );
        db.insert_account(&account)?;
        tracing::info!("created default account");
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
