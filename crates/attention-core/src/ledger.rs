//! Earnings-announcement ledger.
//!
//! The ledger is an append-only CSV file with the header
//! `code,earnings_month,announcement_date` and dates written as `YYYYMMDD`.
//! A [`LedgerSnapshot`] is the in-memory, code-indexed view that the engine
//! reads; it is never mutated during a classification run.

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use chrono::NaiveDate;

use crate::extract::delimited::{split_records, DEFAULT_DELIMITER};
use crate::types::{AttentionResult, EarningsRecord, YearMonth};

pub const LEDGER_HEADER: [&str; 3] = ["code", "earnings_month", "announcement_date"];

const DATE_FORMAT: &str = "%Y%m%d";

/// Read-only view of the ledger, indexed by security code.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    by_code: HashMap<String, Vec<EarningsRecord>>,
    len: usize,
}

impl LedgerSnapshot {
    pub fn from_records(records: impl IntoIterator<Item = EarningsRecord>) -> Self {
        let mut snapshot = Self::default();
        for record in records {
            snapshot
                .by_code
                .entry(record.code.clone())
                .or_default()
                .push(record);
            snapshot.len += 1;
        }
        snapshot
    }

    /// Parse ledger CSV text. Malformed lines are skipped and counted.
    pub fn parse(text: &str) -> (Self, usize) {
        let mut records = Vec::new();
        let mut skipped = 0usize;
        let mut columns: Option<[usize; 3]> = None;

        for fields in split_records(text, DEFAULT_DELIMITER) {
            if fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let Some([code_idx, month_idx, date_idx]) = columns else {
                columns = header_columns(&fields);
                if columns.is_none() {
                    tracing::warn!("Ledger header missing, ignoring line: {}", fields.join(","));
                    skipped += 1;
                }
                continue;
            };
            match parse_line(&fields, code_idx, month_idx, date_idx) {
                Some(record) => records.push(record),
                None => {
                    tracing::debug!("Skipping malformed ledger line: {}", fields.join(","));
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {skipped} malformed ledger lines");
        }
        (Self::from_records(records), skipped)
    }

    /// Load the ledger file. A missing file is an empty ledger.
    pub fn load(path: &Path) -> AttentionResult<(Self, usize)> {
        if !path.exists() {
            tracing::info!("No ledger at {}, starting empty", path.display());
            return Ok((Self::default(), 0));
        }
        let text = std::fs::read_to_string(path)?;
        let (snapshot, skipped) = Self::parse(&text);
        tracing::info!(
            "Loaded {} earnings records from {}",
            snapshot.len(),
            path.display()
        );
        Ok((snapshot, skipped))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every record for `code`, in ledger order.
    pub fn records_for(&self, code: &str) -> &[EarningsRecord] {
        self.by_code.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Records for `code` announced on or before `as_of`, newest first.
    pub fn announced_as_of(&self, code: &str, as_of: NaiveDate) -> Vec<&EarningsRecord> {
        let mut records: Vec<&EarningsRecord> = self
            .records_for(code)
            .iter()
            .filter(|r| r.announcement_date <= as_of)
            .collect();
        records.sort_by(|a, b| b.announcement_date.cmp(&a.announcement_date));
        records
    }

    pub fn contains(&self, code: &str, month: YearMonth, announced: NaiveDate) -> bool {
        self.records_for(code)
            .iter()
            .any(|r| r.earnings_month == month && r.announcement_date == announced)
    }
}

fn header_columns(fields: &[String]) -> Option<[usize; 3]> {
    let position = |name: &str| fields.iter().position(|f| f.trim() == name);
    Some([
        position(LEDGER_HEADER[0])?,
        position(LEDGER_HEADER[1])?,
        position(LEDGER_HEADER[2])?,
    ])
}

fn parse_line(
    fields: &[String],
    code_idx: usize,
    month_idx: usize,
    date_idx: usize,
) -> Option<EarningsRecord> {
    let code = fields.get(code_idx)?.trim();
    if code.is_empty() {
        return None;
    }
    let earnings_month = fields.get(month_idx)?.parse::<YearMonth>().ok()?;
    let announcement_date =
        NaiveDate::parse_from_str(fields.get(date_idx)?.trim(), DATE_FORMAT).ok()?;
    Some(EarningsRecord {
        code: code.to_string(),
        earnings_month,
        announcement_date,
    })
}

/// Render one ledger line (without newline).
pub fn format_record(record: &EarningsRecord) -> String {
    format!(
        "{},{},{}",
        record.code,
        record.earnings_month,
        record.announcement_date.format(DATE_FORMAT)
    )
}

/// Append a record, creating the file (with BOM and header) if needed.
pub fn append_record(path: &Path, record: &EarningsRecord) -> AttentionResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    let size = file.metadata()?.len();
    let mut buf = String::new();
    if size == 0 {
        buf.push('\u{feff}');
        buf.push_str(&LEDGER_HEADER.join(","));
        buf.push('\n');
    } else {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            buf.push('\n');
        }
    }
    buf.push_str(&format_record(record));
    buf.push('\n');

    file.write_all(buf.as_bytes())?;
    tracing::debug!("Appended ledger record: {}", format_record(record));
    Ok(())
}
