//! HTML notice tables with merged cells.
//!
//! Only outermost tables are structural. Rows and cells that belong to a
//! nested table are ignored, although their text still flows into the
//! enclosing cell. Row and column spans are expanded into a rectangular
//! grid with a per-table [`CarryBuffer`].

use scraper::{ElementRef, Html, Node, Selector};

use super::{rows_from_grid, TableGrammar};
use crate::text::clean_text;
use crate::types::{AttentionError, AttentionResult, NoticeRow, Venue};

/// Upper bound on a declared row or column span.
const MAX_SPAN: usize = 1000;

/// A parsed `<td>`/`<th>` before span expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    pub text: String,
    pub rowspan: usize,
    pub colspan: usize,
}

impl RawCell {
    pub fn new(text: &str, rowspan: usize, colspan: usize) -> Self {
        Self {
            text: text.to_string(),
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
        }
    }
}

#[derive(Debug, Clone)]
struct Carried {
    text: String,
    remaining: usize,
}

/// Column-indexed cells still owed to rows below a `rowspan`.
#[derive(Debug, Default)]
pub struct CarryBuffer {
    slots: Vec<Option<Carried>>,
}

impl CarryBuffer {
    pub fn with_width(width: usize) -> Self {
        Self {
            slots: vec![None; width],
        }
    }

    /// Emit carried cells starting at `*col` until a free column is reached.
    fn flush(&mut self, col: &mut usize, out: &mut Vec<String>) {
        while let Some(slot) = self.slots.get_mut(*col) {
            let Some(carried) = slot.as_mut() else {
                break;
            };
            out.push(carried.text.clone());
            carried.remaining -= 1;
            if carried.remaining == 0 {
                *slot = None;
            }
            *col += 1;
        }
    }

    fn register(&mut self, col: usize, text: String, remaining: usize) {
        if col >= self.slots.len() {
            self.slots.resize(col + 1, None);
        }
        self.slots[col] = Some(Carried { text, remaining });
    }
}

/// Expand row and column spans into a grid equivalent to the rendered table.
pub fn expand_spans(rows: &[Vec<RawCell>]) -> Vec<Vec<String>> {
    let width = rows
        .iter()
        .map(|row| row.iter().map(|c| c.colspan).sum::<usize>())
        .max()
        .unwrap_or(0);
    let mut carry = CarryBuffer::with_width(width);
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out = Vec::with_capacity(width);
        let mut col = 0usize;
        for cell in row {
            carry.flush(&mut col, &mut out);
            for span_index in 0..cell.colspan {
                let text = if span_index == 0 {
                    cell.text.clone()
                } else {
                    String::new()
                };
                if cell.rowspan > 1 {
                    carry.register(col, text.clone(), cell.rowspan - 1);
                }
                out.push(text);
                col += 1;
            }
        }
        carry.flush(&mut col, &mut out);
        grid.push(out);
    }
    grid
}

/// The nearest enclosing `<table>` of an element.
fn owning_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Cell text with `<br>` and nested row/cell boundaries kept as line
/// breaks, then cleaned.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut buf = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) if matches!(el.name(), "br" | "tr" | "td" | "th") => buf.push('\n'),
            _ => {}
        }
    }
    clean_text(&buf)
}

/// Collect the structural rows of every outermost table, in document order.
pub fn structural_tables(document: &Html) -> Vec<Vec<Vec<RawCell>>> {
    let table_sel = Selector::parse("table").expect("table selector is valid");
    let row_sel = Selector::parse("tr").expect("row selector is valid");

    let mut tables = Vec::new();
    for table in document.select(&table_sel) {
        if owning_table(table).is_some() {
            continue;
        }
        let mut rows = Vec::new();
        for tr in table.select(&row_sel) {
            if owning_table(tr) != Some(table) {
                continue;
            }
            let cells: Vec<RawCell> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|c| RawCell {
                    text: cell_text(c),
                    rowspan: span_attr(c, "rowspan"),
                    colspan: span_attr(c, "colspan"),
                })
                .collect();
            rows.push(cells);
        }
        if !rows.is_empty() {
            tables.push(rows);
        }
    }
    tables
}

/// Parse the first outermost table that looks like a notice listing.
pub fn parse_html(
    html: &str,
    venue: Venue,
    grammar: &TableGrammar,
) -> AttentionResult<Vec<NoticeRow>> {
    let document = Html::parse_document(html);
    let tables = structural_tables(&document);
    tracing::debug!("{venue}: found {} structural tables", tables.len());

    let mut last_err = AttentionError::NoTable;
    for table in &tables {
        let grid = expand_spans(table);
        match rows_from_grid(&grid, venue, grammar) {
            Ok(rows) => return Ok(rows),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}
