//! Attention Watch core: notice table extraction, signal patterns, and the
//! temporal rule engine that cross-references the earnings ledger.

pub mod engine;
pub mod extract;
pub mod ledger;
pub mod rules;
pub mod signals;
pub mod text;
pub mod types;
pub mod window;

pub use engine::{build_report, retain_latest, Classifier};
pub use extract::{extract_first_usable, extract_notices, SourceFormat, VenueExtraction};
pub use ledger::{append_record, LedgerSnapshot};
pub use rules::{RuleSet, TriggerRule, VenueRules};
pub use signals::{ExtractedSignals, PatternTable, SignalExtractor};
pub use types::*;
pub use window::{filter_by_latest_dates, latest_dates};
