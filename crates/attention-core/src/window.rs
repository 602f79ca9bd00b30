//! Notice-date windows.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::types::{NoticeRow, Venue};

/// The `count` most recent distinct notice dates, oldest first.
pub fn latest_dates(rows: &[NoticeRow], count: usize) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date).collect();
    let skip = dates.len().saturating_sub(count);
    dates.into_iter().skip(skip).collect()
}

/// Keep only rows dated within the `count` most recent distinct dates.
///
/// Returns the kept rows and the window dates, oldest first.
pub fn filter_by_latest_dates(
    rows: &[NoticeRow],
    count: usize,
) -> (Vec<NoticeRow>, Vec<NaiveDate>) {
    let dates = latest_dates(rows, count);
    if dates.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let keep: HashSet<NaiveDate> = dates.iter().copied().collect();
    let filtered = rows
        .iter()
        .filter(|r| keep.contains(&r.date))
        .cloned()
        .collect();
    (filtered, dates)
}

/// Date statistics computed once over the whole input and shared read-only
/// by every group evaluation.
#[derive(Debug, Clone, Default)]
pub struct WindowStats {
    pub recency: BTreeSet<NaiveDate>,
    pub latest_by_venue: BTreeMap<Venue, NaiveDate>,
}

impl WindowStats {
    pub fn compute(rows: &[NoticeRow], recency_days: usize) -> Self {
        let mut latest_by_venue: BTreeMap<Venue, NaiveDate> = BTreeMap::new();
        for row in rows {
            latest_by_venue
                .entry(row.venue)
                .and_modify(|d| *d = (*d).max(row.date))
                .or_insert(row.date);
        }
        Self {
            recency: latest_dates(rows, recency_days).into_iter().collect(),
            latest_by_venue,
        }
    }

    pub fn in_recency(&self, date: NaiveDate) -> bool {
        self.recency.contains(&date)
    }

    /// Most recent date on which `venue` issued any notice.
    pub fn latest_for(&self, venue: Venue) -> Option<NaiveDate> {
        self.latest_by_venue.get(&venue).copied()
    }
}
