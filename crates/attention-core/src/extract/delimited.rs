//! Delimited (CSV) notice exports.

use super::{rows_from_grid, TableGrammar};
use crate::types::{AttentionResult, NoticeRow, Venue};

pub const DEFAULT_DELIMITER: char = ',';

/// Split delimited text into records.
///
/// Handles quoted fields, doubled quotes inside quotes, and line breaks
/// inside quoted fields. A leading byte-order mark is dropped.
pub fn split_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Parse a delimited notice export.
pub fn parse_delimited(
    text: &str,
    venue: Venue,
    grammar: &TableGrammar,
) -> AttentionResult<Vec<NoticeRow>> {
    let grid: Vec<Vec<String>> = split_records(text, DEFAULT_DELIMITER)
        .into_iter()
        .filter(|record| record.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    tracing::debug!("{venue}: {} non-blank delimited records", grid.len());
    rows_from_grid(&grid, venue, grammar)
}
