//! Source adapter abstraction
//!
//! A source adapter enumerates the records a system holds and moves one
//! record at a time toward a backup target. The two variants differ in
//! their transfer path: network sources ask the serving peer to push
//! directly to the archive, database sources synthesize the record locally
//! and route it through staging.
//!
//! Adapters perform exactly one transfer attempt per `transfer` call.
//! Retry policy, attempt timeouts, and bookkeeping live in the
//! orchestrator, which sees every adapter through this trait.

use crate::domain::model::{BackupTarget, CandidateRecord, QueryCriteria, TransferOutcome};
use crate::domain::Result;
use async_trait::async_trait;

/// What one transfer attempt produced.
///
/// `payload` carries the serialized record bytes for transfers that passed
/// through this process, so the verifier can compare the archive copy
/// byte-for-byte. Network pushes move peer-to-peer and have no payload to
/// compare; those are verified by existence only.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub outcome: TransferOutcome,
    pub payload: Option<Vec<u8>>,
}

impl TransferReport {
    /// Report for a peer-to-peer push; the pipeline never held the bytes.
    pub fn push(outcome: TransferOutcome) -> Self {
        Self {
            outcome,
            payload: None,
        }
    }

    /// Report for a transfer whose payload passed through this process.
    pub fn synthesized(outcome: TransferOutcome, payload: Vec<u8>) -> Self {
        Self {
            outcome,
            payload: Some(payload),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// A system records can be backed up from.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source alias from configuration, used in logs and session keys.
    fn name(&self) -> &str;

    /// Variant tag: "network" or "database".
    fn kind(&self) -> &'static str;

    /// The criteria this source enumerates with when the caller has none.
    fn default_criteria(&self) -> QueryCriteria;

    /// Enumerates candidate records matching `criteria`, in the order the
    /// source reports them.
    ///
    /// An empty result is a clean no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AegisError::Enumeration`](crate::domain::AegisError::Enumeration)
    /// when the source rejects the query or cannot be reached; the caller
    /// abandons the run with zero processed records.
    async fn find(&self, criteria: &QueryCriteria) -> Result<Vec<CandidateRecord>>;

    /// Makes exactly one attempt to move `record` to `destination`.
    ///
    /// Never returns an error: every way an attempt can end is folded into
    /// the report's [`TransferOutcome`] so the retry loop has one shape to
    /// inspect.
    async fn transfer(&self, record: &CandidateRecord, destination: &BackupTarget)
        -> TransferReport;

    /// Checks the source is reachable without transferring anything.
    async fn probe(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FailureReason;

    #[test]
    fn push_report_has_no_payload() {
        let report = TransferReport::push(TransferOutcome::Success);
        assert!(report.is_success());
        assert!(report.payload.is_none());
    }

    #[test]
    fn synthesized_report_keeps_payload() {
        let report = TransferReport::synthesized(
            TransferOutcome::TransientFailure(FailureReason::Store("busy".to_string())),
            vec![1, 2, 3],
        );
        assert!(!report.is_success());
        assert_eq!(report.payload.as_deref(), Some(&[1u8, 2, 3][..]));
    }
}
