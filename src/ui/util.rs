use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::Transaction;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs().round_dp(2);
    let formatted = format!("{abs:.2}");
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Amount with a direction sign: `+` for income, `-` for expenses, none
/// for anything else.
pub(crate) fn format_signed(txn: &Transaction) -> String {
    let amount = format_amount(txn.amount.abs());
    if txn.is_income() {
        format!("+{amount}")
    } else if txn.is_expense() {
        format!("-{amount}")
    } else {
        amount
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max - 1).collect();
    format!("{truncated}…")
}

/// Horizontal bar for `value` scaled against `max` over `width` cells.
/// Any positive value gets at least one cell.
pub(crate) fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if width == 0 || max <= Decimal::ZERO || value <= Decimal::ZERO {
        return String::new();
    }
    let ratio = value.checked_div(max).map_or(Decimal::ONE, |r| r.min(Decimal::ONE));
    let cells = (ratio * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
        .clamp(1, width);
    "█".repeat(cells)
}

/// `part` as a whole percentage of `total`. `None` when total is not
/// positive or the percentage does not fit in a `Decimal`.
pub(crate) fn percent_of(part: Decimal, total: Decimal) -> Option<Decimal> {
    if total <= Decimal::ZERO {
        return None;
    }
    part.checked_div(total)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|pct| pct.round())
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

/// Jump cursor to the bottom of a list.
pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}
