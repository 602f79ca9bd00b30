//! Attention-notice table extraction.
//!
//! Both venues publish the same notice listing in two serializations: an HTML
//! page whose tables use merged cells, and a delimited export. Each path
//! first reduces its input to a rectangular grid of cleaned cell strings and
//! then shares one header search, column resolution and row conversion step.
//!
//! Extraction errors are per-attempt: callers are expected to fall back to
//! another serialization (see [`extract_first_usable`]). Malformed data rows
//! are skipped, never fatal.

pub mod delimited;
pub mod html;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::text::{clean_cell, clean_text, normalize_header, parse_local_date};
use crate::types::{AttentionError, AttentionResult, NoticeRow, Venue};

/// Declared serialization of a raw notice listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Html,
    Delimited,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Html => "HTML",
            SourceFormat::Delimited => "CSV",
        }
    }
}

/// Column labels that identify a notice table.
#[derive(Debug, Clone, Copy)]
pub struct TableGrammar {
    pub code: &'static str,
    pub name: &'static str,
    pub info: &'static str,
    /// Date column labels, in order of preference.
    pub dates: &'static [&'static str],
}

const NOTICE_GRAMMAR: TableGrammar = TableGrammar {
    code: "證券代號",
    name: "證券名稱",
    info: "注意交易資訊",
    dates: &["日期", "公告日期"],
};

impl TableGrammar {
    /// Grammar for a venue's notice listing. Both venues currently share labels.
    pub fn for_venue(venue: Venue) -> Self {
        match venue {
            Venue::Primary | Venue::Secondary => NOTICE_GRAMMAR,
        }
    }
}

/// Extract notice rows from raw text.
pub fn extract_notices(
    raw: &str,
    format: SourceFormat,
    venue: Venue,
) -> AttentionResult<Vec<NoticeRow>> {
    let grammar = TableGrammar::for_venue(venue);
    match format {
        SourceFormat::Html => html::parse_html(raw, venue, &grammar),
        SourceFormat::Delimited => delimited::parse_delimited(raw, venue, &grammar),
    }
}

/// Rows recovered for one venue plus the failures met on the way.
#[derive(Debug, Clone, Default)]
pub struct VenueExtraction {
    pub rows: Vec<NoticeRow>,
    pub warnings: Vec<String>,
}

/// Try each `(raw, format)` attempt in order and keep the first that parses.
pub fn extract_first_usable(venue: Venue, attempts: &[(&str, SourceFormat)]) -> VenueExtraction {
    let mut result = VenueExtraction::default();
    for (raw, format) in attempts {
        match extract_notices(raw, *format, venue) {
            Ok(rows) => {
                tracing::debug!(
                    "{venue} {} extraction produced {} rows",
                    format.as_str(),
                    rows.len()
                );
                result.rows = rows;
                return result;
            }
            Err(e) => {
                tracing::warn!("{venue} {} extraction failed: {e}", format.as_str());
                result
                    .warnings
                    .push(format!("{venue} {} extraction failed: {e}", format.as_str()));
            }
        }
    }
    result
}

/// Index of the first row containing every required header label.
fn find_header_row(grid: &[Vec<String>], grammar: &TableGrammar) -> Option<usize> {
    grid.iter().position(|row| {
        let labels: HashSet<String> = row.iter().map(|cell| normalize_header(cell)).collect();
        [grammar.code, grammar.name, grammar.info]
            .iter()
            .all(|required| labels.contains(*required))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    code: usize,
    name: usize,
    info: usize,
    date: usize,
}

impl Columns {
    fn resolve(header: &[String], grammar: &TableGrammar) -> AttentionResult<Self> {
        let labels: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let index_of = |label: &str| labels.iter().position(|l| l == label);

        let code = index_of(grammar.code).ok_or(AttentionError::MissingColumn("code"))?;
        let name = index_of(grammar.name).ok_or(AttentionError::MissingColumn("name"))?;
        let info = index_of(grammar.info).ok_or(AttentionError::MissingColumn("info"))?;
        let date = grammar
            .dates
            .iter()
            .find_map(|&label| index_of(label))
            .ok_or(AttentionError::MissingColumn("date"))?;

        Ok(Self {
            code,
            name,
            info,
            date,
        })
    }

    fn max(&self) -> usize {
        self.code.max(self.name).max(self.info).max(self.date)
    }
}

/// Convert a cell grid into notice rows.
pub(crate) fn rows_from_grid(
    grid: &[Vec<String>],
    venue: Venue,
    grammar: &TableGrammar,
) -> AttentionResult<Vec<NoticeRow>> {
    let header_idx = find_header_row(grid, grammar).ok_or(AttentionError::HeaderNotFound)?;
    let columns = Columns::resolve(&grid[header_idx], grammar)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for cells in &grid[header_idx + 1..] {
        if cells.len() <= columns.max() {
            skipped += 1;
            continue;
        }
        let code = clean_cell(&cells[columns.code]);
        if code.is_empty() {
            skipped += 1;
            continue;
        }
        let date = match parse_local_date(&clean_cell(&cells[columns.date])) {
            Ok(date) => date,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        rows.push(NoticeRow {
            venue,
            code,
            name: clean_cell(&cells[columns.name]),
            date,
            info: clean_text(&cells[columns.info]),
        });
    }

    if skipped > 0 {
        tracing::debug!("{venue}: skipped {skipped} unusable rows");
    }
    Ok(rows)
}
