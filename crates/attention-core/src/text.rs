//! Cell cleaning, header normalization, and local-calendar dates.

use chrono::NaiveDate;

use crate::types::{AttentionError, AttentionResult};

/// Offset from the local (ROC) calendar year to the Gregorian year.
pub const ERA_OFFSET: i32 = 1911;

/// Collapse every whitespace run (full-width and no-break spaces included)
/// into a single ASCII space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip all whitespace so header labels match regardless of spacing.
pub fn normalize_header(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Clean a cell value, unwrapping the spreadsheet `="…"` text escape.
pub fn clean_cell(value: &str) -> String {
    let text = value.trim();
    let text = match text.strip_prefix("=\"").and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner,
        None => text,
    };
    clean_text(text)
}

/// Parse a local-calendar date such as `113/01/15` or `113.1.15`.
pub fn parse_local_date(value: &str) -> AttentionResult<NaiveDate> {
    let invalid = || AttentionError::InvalidDate(value.to_string());

    let text = clean_text(value).replace('.', "/");
    let parts: Vec<&str> = text.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let local_year: i32 = parts[0].trim().parse().map_err(|_| invalid())?;
    let month: u32 = parts[1].trim().parse().map_err(|_| invalid())?;
    let day: u32 = parts[2].trim().parse().map_err(|_| invalid())?;

    let year = local_year.checked_add(ERA_OFFSET).ok_or_else(invalid)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Derivative instruments (warrants and the like) carry 5+ digit codes.
pub fn is_derivative_code(code: &str) -> bool {
    code.chars().filter(|c| c.is_ascii_digit()).count() >= 5
}
