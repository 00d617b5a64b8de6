//! Transfer transport abstraction
//!
//! This module defines the [`DimseTransport`] trait that abstracts the
//! query/retrieve and store operations the pipeline performs against
//! networked peers. The production implementation drives a DIMSE gateway
//! over HTTP; tests substitute in-memory doubles.
//!
//! The transport reports wire facts (final status word, sub-operation
//! counts) without judging them. Classification into success, transient
//! failure, or fatal failure belongs to the callers via
//! [`classify_status`](super::status::classify_status), so source adapters
//! and the verifier read identical semantics from the same numbers.

use crate::domain::ids::{ObjectId, PeerId};
use crate::domain::model::{QueryCriteria, UidSet};
use crate::domain::Result;
use async_trait::async_trait;

/// Final report of one retrieve-push (move) operation.
///
/// Each field is taken verbatim from the serving peer's final response.
/// A push can report a success status word while still having dropped
/// sub-operations; callers must inspect `failed`, not just `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    /// Final status word reported by the serving peer
    pub status: u16,
    /// Sub-operations that completed
    pub completed: u32,
    /// Sub-operations that failed
    pub failed: u32,
    /// Sub-operations that completed with warnings
    pub warnings: u32,
}

impl PushReport {
    /// True when the peer reported clean success with no dropped sub-operations.
    pub fn is_clean(&self) -> bool {
        super::status::classify_status(self.status, self.failed).is_success()
    }
}

/// Result of one retrieve-pull (get) operation: the final status word and
/// the raw bytes of the pulled object, when one arrived.
#[derive(Debug, Clone)]
pub struct PulledObject {
    /// Final status word reported by the serving peer
    pub status: u16,
    /// Raw object bytes, absent when the peer returned nothing
    pub payload: Option<Vec<u8>>,
}

/// Final report of one store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReport {
    /// Status word reported by the receiving peer
    pub status: u16,
}

impl StoreReport {
    /// True when the receiving peer accepted the object.
    pub fn is_accepted(&self) -> bool {
        super::status::classify_status(self.status, 0).is_success()
    }
}

/// Query/retrieve and store operations against networked peers.
///
/// Every method performs exactly one network operation per call. Retry
/// policy lives in the orchestrator, not here; an implementation must not
/// re-issue a move, get, or store on its own.
#[async_trait]
pub trait DimseTransport: Send + Sync {
    /// Verifies basic reachability of a peer with an echo request.
    async fn echo(&self, peer: &PeerId) -> Result<()>;

    /// Queries a peer for objects matching the criteria.
    ///
    /// Returns the identifier sets of every match. An empty result is not
    /// an error; a peer that rejects the query is.
    async fn query(&self, peer: &PeerId, criteria: &QueryCriteria) -> Result<Vec<UidSet>>;

    /// Asks `peer` to push the objects identified by `uids` to `destination`.
    ///
    /// The serving peer transfers directly to the destination; the payload
    /// never passes through this process. Exactly one attempt is made.
    async fn retrieve_push(
        &self,
        peer: &PeerId,
        uids: &UidSet,
        destination: &PeerId,
    ) -> Result<PushReport>;

    /// Pulls the object identified by `uids` from `peer` into memory.
    ///
    /// Used by verification to fetch archived bytes for comparison.
    async fn retrieve_pull(&self, peer: &PeerId, uids: &UidSet) -> Result<PulledObject>;

    /// Stores `payload` as the object `object_id` on `peer`.
    ///
    /// Exactly one attempt is made.
    async fn store(&self, peer: &PeerId, object_id: &ObjectId, payload: &[u8]) -> Result<StoreReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_report_clean_requires_zero_failed() {
        let clean = PushReport {
            status: 0x0000,
            completed: 4,
            failed: 0,
            warnings: 0,
        };
        assert!(clean.is_clean());

        let partial = PushReport {
            status: 0x0000,
            completed: 3,
            failed: 1,
            warnings: 0,
        };
        assert!(!partial.is_clean());

        let warned = PushReport {
            status: 0xB000,
            completed: 4,
            failed: 0,
            warnings: 1,
        };
        assert!(!warned.is_clean());
    }

    #[test]
    fn store_report_accepts_only_success_word() {
        assert!(StoreReport { status: 0x0000 }.is_accepted());
        assert!(!StoreReport { status: 0xC000 }.is_accepted());
        assert!(!StoreReport { status: 0xB000 }.is_accepted());
    }
}
