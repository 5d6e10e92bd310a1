#![allow(clippy::unwrap_used)]

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_take_flag_anywhere() {
    let mut a = args(&["-v", "summary", "2024-05"]);
    assert!(take_flag(&mut a, &["--verbose", "-v"]));
    assert_eq!(a, ["summary", "2024-05"]);

    let mut a = args(&["summary", "--verbose"]);
    assert!(take_flag(&mut a, &["--verbose", "-v"]));
    assert_eq!(a, ["summary"]);

    let mut a = args(&["summary"]);
    assert!(!take_flag(&mut a, &["--verbose", "-v"]));
}

#[test]
fn test_take_flag_keeps_option_values() {
    let mut a = args(&["transactions", "--search", "-v"]);
    assert!(!take_flag(&mut a, &["--verbose", "-v"]));
    assert_eq!(a, ["transactions", "--search", "-v"]);

    let mut a = args(&["-v", "transactions", "--search", "-v"]);
    assert!(take_flag(&mut a, &["--verbose", "-v"]));
    assert_eq!(a, ["transactions", "--search", "-v"]);
}
