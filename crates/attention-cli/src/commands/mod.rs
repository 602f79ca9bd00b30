//! Command implementations shared by the binary and the integration tests.

pub mod classify;
pub mod ledger;

pub use classify::{ClassifyOptions, ClassifyOutcome, VenueInputs};
pub use ledger::{AddOutcome, LedgerCheck};
