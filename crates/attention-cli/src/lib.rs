//! Attention Watch CLI: classify attention notices against the earnings ledger.

pub mod commands;
pub mod config;
pub mod report;

pub use commands::{ClassifyOptions, ClassifyOutcome, VenueInputs};
pub use config::resolve_ledger_path;
