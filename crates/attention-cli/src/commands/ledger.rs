//! The `ledger` commands.

use std::path::Path;

use anyhow::{bail, Context};
use chrono::NaiveDate;

use attention_core::ledger::append_record;
use attention_core::{EarningsRecord, LedgerSnapshot, YearMonth};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(EarningsRecord),
    AlreadyRecorded(EarningsRecord),
}

/// Validate raw arguments into a ledger record.
pub fn parse_record(code: &str, month: &str, date: &str) -> anyhow::Result<EarningsRecord> {
    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        bail!("Invalid security code: {code:?}");
    }
    let earnings_month: YearMonth = month
        .parse()
        .with_context(|| format!("Month must be YYYYMM, got {month:?}"))?;
    let announcement_date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Date must be YYYY-MM-DD, got {date:?}"))?;
    Ok(EarningsRecord {
        code: code.to_string(),
        earnings_month,
        announcement_date,
    })
}

/// Append a record unless the same (code, month, date) is already present.
pub fn add(path: &Path, code: &str, month: &str, date: &str) -> anyhow::Result<AddOutcome> {
    let record = parse_record(code, month, date)?;
    let (ledger, _) = LedgerSnapshot::load(path)
        .with_context(|| format!("loading ledger {}", path.display()))?;

    if ledger.contains(&record.code, record.earnings_month, record.announcement_date) {
        return Ok(AddOutcome::AlreadyRecorded(record));
    }
    append_record(path, &record).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Added {} {} to {}", record.code, record.earnings_month, path.display());
    Ok(AddOutcome::Added(record))
}

/// Counts reported by `ledger check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCheck {
    pub exists: bool,
    pub records: usize,
    pub skipped: usize,
}

pub fn check(path: &Path) -> anyhow::Result<LedgerCheck> {
    let (ledger, skipped) = LedgerSnapshot::load(path)
        .with_context(|| format!("loading ledger {}", path.display()))?;
    Ok(LedgerCheck {
        exists: path.exists(),
        records: ledger.len(),
        skipped,
    })
}
