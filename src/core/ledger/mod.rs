//! Run ledger
//!
//! Durable terminal-outcome bookkeeping. Each record's last terminal
//! outcome is kept in a JSON file so later runs skip what already
//! succeeded and retry what did not.

pub mod entry;
pub mod store;

pub use entry::{LedgerEntry, LedgerOutcome};
pub use store::RunLedger;
