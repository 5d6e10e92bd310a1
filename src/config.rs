use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::summary::FlowLabels;

const HOME_VAR: &str = "FLOWDASH_HOME";
const DB_VAR: &str = "FLOWDASH_DB";
const RECENT_VAR: &str = "FLOWDASH_RECENT";

const DB_FILE: &str = "flowdash.db";
const LOG_FILE: &str = "flowdash.log";
pub(crate) const DEFAULT_RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    /// How many transactions the dashboard lists under "recent".
    pub(crate) recent_limit: usize,
    pub(crate) labels: FlowLabels,
}

impl Config {
    /// Resolve paths and settings from the environment, creating the data
    /// directory if needed.
    pub(crate) fn load() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                config.data_dir.display()
            )
        })?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match non_empty(HOME_VAR) {
            Some(home) => PathBuf::from(home),
            None => directories::ProjectDirs::from("com", "flowdash", "FlowDash")
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .data_dir()
                .to_path_buf(),
        };

        let db_path = non_empty(DB_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DB_FILE));

        let recent_limit = match non_empty(RECENT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{RECENT_VAR} must be a whole number, got '{raw}'"))?,
            None => DEFAULT_RECENT_LIMIT,
        };

        Ok(Self {
            log_path: data_dir.join(LOG_FILE),
            data_dir,
            db_path,
            recent_limit,
            labels: FlowLabels::default(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
