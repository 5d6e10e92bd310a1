#![allow(clippy::unwrap_used)]

use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_home_override_derives_paths() {
    let config = Config::from_lookup(lookup(&[("FLOWDASH_HOME", "/tmp/fd")])).unwrap();
    assert_eq!(config.data_dir, PathBuf::from("/tmp/fd"));
    assert_eq!(config.db_path, PathBuf::from("/tmp/fd/flowdash.db"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/fd/flowdash.log"));
    assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
}

#[test]
fn test_db_override_keeps_log_in_home() {
    let config = Config::from_lookup(lookup(&[
        ("FLOWDASH_HOME", "/tmp/fd"),
        ("FLOWDASH_DB", "/data/other.db"),
    ]))
    .unwrap();
    assert_eq!(config.db_path, PathBuf::from("/data/other.db"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/fd/flowdash.log"));
}

#[test]
fn test_empty_home_is_ignored() {
    let config = Config::from_lookup(lookup(&[("FLOWDASH_HOME", "  ")]));
    // Falls back to the platform directory, which may not exist in a sandbox.
    if let Ok(config) = config {
        assert_ne!(config.data_dir, PathBuf::from("  "));
    }
}

#[test]
fn test_recent_limit_override() {
    let config = Config::from_lookup(lookup(&[
        ("FLOWDASH_HOME", "/tmp/fd"),
        ("FLOWDASH_RECENT", "10"),
    ]))
    .unwrap();
    assert_eq!(config.recent_limit, 10);
}

#[test]
fn test_recent_limit_invalid() {
    let err = Config::from_lookup(lookup(&[
        ("FLOWDASH_HOME", "/tmp/fd"),
        ("FLOWDASH_RECENT", "many"),
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("FLOWDASH_RECENT"));
}

#[test]
fn test_default_labels() {
    let config = Config::from_lookup(lookup(&[("FLOWDASH_HOME", "/tmp/fd")])).unwrap();
    assert_eq!(config.labels.income, "Income");
    assert_eq!(config.labels.savings, "Savings");
}
