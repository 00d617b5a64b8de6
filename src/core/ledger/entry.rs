//! Ledger entry model for terminal transfer outcomes
//!
//! This module defines the entry structure the run ledger stores per object
//! id. Entries are written exactly once per object id per run, at the
//! record's terminal transition, and read at the start of the next run to
//! filter out already-backed-up records.

use crate::domain::ids::{ObjectId, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal outcome of a record within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOutcome {
    /// Transfer reached the destination
    Succeeded,
    /// Transfer exhausted its retries or hit a fatal failure
    Failed,
}

/// One terminal record outcome, keyed by object id
///
/// The ledger holds at most one entry per object id. A new terminal outcome
/// for an id already present replaces the old entry, so a record that failed
/// in a prior run and succeeds later ends up `Succeeded`. An id with a
/// `Succeeded` entry is never re-attempted.
///
/// # Examples
///
/// ```
/// use aegis::core::ledger::entry::{LedgerEntry, LedgerOutcome};
/// use aegis::domain::ids::{ObjectId, RunId};
///
/// let object_id = ObjectId::new("1.2.826.0.1.3680043.10.1.42.77").unwrap();
/// let run_id = RunId::generate();
///
/// let entry = LedgerEntry::succeeded(object_id, run_id, 2, Some("a1b2".into()));
/// assert_eq!(entry.outcome, LedgerOutcome::Succeeded);
/// assert_eq!(entry.attempts, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Object id this entry records
    pub object_id: ObjectId,

    /// Terminal outcome of the last run that touched this id
    pub outcome: LedgerOutcome,

    /// Number of transfer attempts consumed in that run (1..=max_retries)
    pub attempts: u32,

    /// Run that produced this entry
    pub run_id: RunId,

    /// When the terminal outcome was recorded
    pub recorded_at: DateTime<Utc>,

    /// Failure reason code for `Failed` entries ("push", "store", "forward",
    /// "synthesis", "timeout", "transport")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// SHA-256 digest of the transferred bytes, when the pipeline held them
    ///
    /// Present for database-origin records (the bytes pass through this
    /// process); absent for network push transfers, where the payload moves
    /// peer-to-peer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl LedgerEntry {
    /// Build a `Succeeded` entry.
    pub fn succeeded(
        object_id: ObjectId,
        run_id: RunId,
        attempts: u32,
        digest: Option<String>,
    ) -> Self {
        Self {
            object_id,
            outcome: LedgerOutcome::Succeeded,
            attempts,
            run_id,
            recorded_at: Utc::now(),
            reason: None,
            digest,
        }
    }

    /// Build a `Failed` entry carrying the reason code of the last attempt.
    pub fn failed(object_id: ObjectId, run_id: RunId, attempts: u32, reason: String) -> Self {
        Self {
            object_id,
            outcome: LedgerOutcome::Failed,
            attempts,
            run_id,
            recorded_at: Utc::now(),
            reason: Some(reason),
            digest: None,
        }
    }

    /// True when this entry records a successful backup.
    pub fn is_succeeded(&self) -> bool {
        self.outcome == LedgerOutcome::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_id() -> ObjectId {
        ObjectId::new("1.2.826.0.1.3680043.10.1.42.77").unwrap()
    }

    #[test]
    fn succeeded_entry_has_no_reason() {
        let entry = LedgerEntry::succeeded(object_id(), RunId::generate(), 1, None);
        assert!(entry.is_succeeded());
        assert!(entry.reason.is_none());
    }

    #[test]
    fn failed_entry_carries_reason_code() {
        let entry = LedgerEntry::failed(object_id(), RunId::generate(), 7, "store".to_string());
        assert!(!entry.is_succeeded());
        assert_eq!(entry.reason.as_deref(), Some("store"));
        assert_eq!(entry.attempts, 7);
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = LedgerEntry::succeeded(
            object_id(),
            RunId::generate(),
            3,
            Some("deadbeef".to_string()),
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.object_id, entry.object_id);
        assert_eq!(back.outcome, entry.outcome);
        assert_eq!(back.attempts, 3);
        assert_eq!(back.digest.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn outcome_serializes_snake_case() {
        let json = serde_json::to_string(&LedgerOutcome::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");
    }
}
