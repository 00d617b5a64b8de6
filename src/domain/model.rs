//! Core pipeline data model
//!
//! The unit-of-work types that flow from enumeration through transfer,
//! retry, and the run ledger. A `CandidateRecord` is created once by a
//! source adapter, consumed once by the orchestrator, and never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::ids::{ObjectId, PeerId};
use super::record::DeliveryRow;

/// Query granularity for network query/retrieve peers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLevel {
    Patient,
    Study,
    Series,
    Image,
}

impl QueryLevel {
    /// Wire form used in query identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryLevel::Patient => "PATIENT",
            QueryLevel::Study => "STUDY",
            QueryLevel::Series => "SERIES",
            QueryLevel::Image => "IMAGE",
        }
    }
}

impl fmt::Display for QueryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueryLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "patient" => Ok(QueryLevel::Patient),
            "study" => Ok(QueryLevel::Study),
            "series" => Ok(QueryLevel::Series),
            "image" => Ok(QueryLevel::Image),
            other => Err(format!(
                "Query level must be one of patient, study, series, image; got \"{other}\""
            )),
        }
    }
}

/// The match criterion a candidate satisfied.
///
/// Filters are attribute/value pairs in a sorted map so two criteria built
/// from the same inputs always compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCriteria {
    pub level: QueryLevel,
    pub filters: BTreeMap<String, String>,
}

impl QueryCriteria {
    /// Creates an empty criterion at the given granularity
    pub fn at_level(level: QueryLevel) -> Self {
        Self {
            level,
            filters: BTreeMap::new(),
        }
    }

    /// Adds one attribute filter
    pub fn with_filter(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(attribute.into(), value.into());
        self
    }
}

/// Hierarchical identifier set for one network-enumerated object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidSet {
    pub patient_id: Option<String>,
    pub study_uid: Option<String>,
    pub series_uid: Option<String>,
    pub instance_uid: String,
}

/// Network endpoint of one transfer destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEndpoint {
    /// Identity the destination is registered under
    pub peer: PeerId,
    pub host: String,
    pub port: u16,
}

/// A transfer destination and its role in the pipeline.
///
/// The archive is the durable destination whose contents the verifier
/// audits. Staging is a transient hop for database-origin records and
/// carries no verification obligation; an object sitting only on staging
/// is not backed up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum BackupTarget {
    Archive(TargetEndpoint),
    Staging(TargetEndpoint),
}

impl BackupTarget {
    pub fn archive(peer: PeerId, host: impl Into<String>, port: u16) -> Self {
        BackupTarget::Archive(TargetEndpoint {
            peer,
            host: host.into(),
            port,
        })
    }

    pub fn staging(peer: PeerId, host: impl Into<String>, port: u16) -> Self {
        BackupTarget::Staging(TargetEndpoint {
            peer,
            host: host.into(),
            port,
        })
    }

    /// Registered identity the transport routes by
    pub fn peer(&self) -> &PeerId {
        &self.endpoint().peer
    }

    pub fn endpoint(&self) -> &TargetEndpoint {
        match self {
            BackupTarget::Archive(e) | BackupTarget::Staging(e) => e,
        }
    }

    /// Only archive targets are verified after transfer.
    pub fn supports_verification(&self) -> bool {
        matches!(self, BackupTarget::Archive(_))
    }

    pub fn role(&self) -> &'static str {
        match self {
            BackupTarget::Archive(_) => "archive",
            BackupTarget::Staging(_) => "staging",
        }
    }
}

impl fmt::Display for BackupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = self.endpoint();
        write!(
            f,
            "{} ({} {}:{})",
            endpoint.peer,
            self.role(),
            endpoint.host,
            endpoint.port
        )
    }
}

/// Where a candidate came from, with the inputs its transfer path needs
#[derive(Debug, Clone)]
pub enum CandidateOrigin {
    /// Enumerated from a network query/retrieve peer
    Network(UidSet),
    /// Enumerated from a database query template row
    Database(Box<DeliveryRow>),
}

/// One unit of backup work.
///
/// Created by source-adapter enumeration, consumed exactly once by the
/// orchestrator's retry loop.
#[derive(Debug, Clone)]
pub struct CandidateRecord {
    pub object_id: ObjectId,
    pub origin: CandidateOrigin,
    pub matched: QueryCriteria,
}

impl CandidateRecord {
    pub fn network(object_id: ObjectId, uids: UidSet, matched: QueryCriteria) -> Self {
        Self {
            object_id,
            origin: CandidateOrigin::Network(uids),
            matched,
        }
    }

    pub fn database(object_id: ObjectId, row: DeliveryRow, matched: QueryCriteria) -> Self {
        Self {
            object_id,
            origin: CandidateOrigin::Database(Box::new(row)),
            matched,
        }
    }
}

/// Why a transfer attempt failed.
///
/// The code distinguishes phases that retry policy and operators must tell
/// apart, in particular a staging `store` failure (record never left
/// staging) from a `forward` failure (record left staging but never reached
/// the archive, so an orphaned staging copy may exist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Direct retrieve-push to the archive failed
    Push(String),
    /// Staging store phase failed; forward was never attempted
    Store(String),
    /// Staging forward phase failed; a copy may be orphaned on staging
    Forward(String),
    /// The record could not be synthesized from its source row
    Synthesis(String),
    /// The attempt exceeded its per-attempt timeout
    Timeout(String),
    /// Session or gateway infrastructure failure
    Transport(String),
}

impl FailureReason {
    /// Stable reason code recorded in the ledger
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::Push(_) => "push",
            FailureReason::Store(_) => "store",
            FailureReason::Forward(_) => "forward",
            FailureReason::Synthesis(_) => "synthesis",
            FailureReason::Timeout(_) => "timeout",
            FailureReason::Transport(_) => "transport",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            FailureReason::Push(d)
            | FailureReason::Store(d)
            | FailureReason::Forward(d)
            | FailureReason::Synthesis(d)
            | FailureReason::Timeout(d)
            | FailureReason::Transport(d) => d,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.detail())
    }
}

/// Outcome of exactly one transfer attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    Success,
    /// Worth retrying, up to the configured maximum
    TransientFailure(FailureReason),
    /// Retrying cannot help; the record fails immediately
    FatalFailure(FailureReason),
}

impl TransferOutcome {
    /// Folds an infrastructure error into an attempt outcome, keeping the
    /// phase attribution the caller supplies.
    pub fn from_error(
        error: &super::errors::AegisError,
        reason: impl FnOnce(String) -> FailureReason,
    ) -> Self {
        let detail = error.to_string();
        if error.is_retryable() {
            TransferOutcome::TransientFailure(reason(detail))
        } else {
            TransferOutcome::FatalFailure(reason(detail))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, TransferOutcome::FatalFailure(_))
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            TransferOutcome::Success => None,
            TransferOutcome::TransientFailure(r) | TransferOutcome::FatalFailure(r) => Some(r),
        }
    }
}

/// One recorded try of moving one record to one destination.
///
/// Attempt numbers for a given object within a run are contiguous starting
/// at 1; a `Success` or `FatalFailure` attempt is always the last one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferAttempt {
    pub object_id: ObjectId,
    pub destination: String,
    pub attempt_number: u32,
    pub outcome: TransferOutcome,
    pub timestamp: DateTime<Utc>,
}

impl TransferAttempt {
    pub fn new(
        object_id: ObjectId,
        destination: impl Into<String>,
        attempt_number: u32,
        outcome: TransferOutcome,
    ) -> Self {
        Self {
            object_id,
            destination: destination.into(),
            attempt_number,
            outcome,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_level_wire_form() {
        assert_eq!(QueryLevel::Patient.as_str(), "PATIENT");
        assert_eq!(QueryLevel::Image.as_str(), "IMAGE");
        assert_eq!(format!("{}", QueryLevel::Series), "SERIES");
    }

    #[test]
    fn test_query_level_parses_case_insensitively() {
        assert_eq!("image".parse::<QueryLevel>().unwrap(), QueryLevel::Image);
        assert_eq!("STUDY".parse::<QueryLevel>().unwrap(), QueryLevel::Study);
        assert!("volume".parse::<QueryLevel>().is_err());
    }

    #[test]
    fn test_query_criteria_builder() {
        let criteria = QueryCriteria::at_level(QueryLevel::Image)
            .with_filter("Modality", "RTRECORD")
            .with_filter("StudyDate", "20240101-20240201");

        assert_eq!(criteria.level, QueryLevel::Image);
        assert_eq!(
            criteria.filters.get("Modality"),
            Some(&"RTRECORD".to_string())
        );
        assert_eq!(criteria.filters.len(), 2);
    }

    #[test]
    fn test_query_criteria_filters_are_ordered() {
        let a = QueryCriteria::at_level(QueryLevel::Study)
            .with_filter("b", "2")
            .with_filter("a", "1");
        let b = QueryCriteria::at_level(QueryLevel::Study)
            .with_filter("a", "1")
            .with_filter("b", "2");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_backup_target_roles() {
        let peer = crate::domain::PeerId::new("ARCHIVE_SCP").unwrap();
        let archive = BackupTarget::archive(peer.clone(), "10.0.4.21", 104);
        let staging = BackupTarget::staging(peer.clone(), "10.0.4.22", 104);

        assert!(archive.supports_verification());
        assert!(!staging.supports_verification());
        assert_eq!(archive.role(), "archive");
        assert_eq!(staging.role(), "staging");
        assert_eq!(archive.peer(), &peer);
        assert_eq!(
            archive.to_string(),
            "ARCHIVE_SCP (archive 10.0.4.21:104)"
        );
    }

    #[test]
    fn test_failure_reason_codes() {
        let store = FailureReason::Store("peer refused association".to_string());
        let forward = FailureReason::Forward("archive unreachable".to_string());

        assert_eq!(store.code(), "store");
        assert_eq!(forward.code(), "forward");
        assert_eq!(store.to_string(), "store: peer refused association");
    }

    #[test]
    fn test_transfer_outcome_predicates() {
        assert!(TransferOutcome::Success.is_success());
        assert!(!TransferOutcome::Success.is_fatal());

        let transient =
            TransferOutcome::TransientFailure(FailureReason::Timeout("120s".to_string()));
        assert!(!transient.is_success());
        assert!(!transient.is_fatal());
        assert_eq!(transient.reason().map(|r| r.code()), Some("timeout"));

        let fatal =
            TransferOutcome::FatalFailure(FailureReason::Synthesis("missing name".to_string()));
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_outcome_from_error_follows_retryability() {
        use crate::domain::{AegisError, TransportError};

        let transient = AegisError::Transport(TransportError::Timeout("120s".to_string()));
        let outcome = TransferOutcome::from_error(&transient, FailureReason::Store);
        assert!(matches!(
            outcome,
            TransferOutcome::TransientFailure(FailureReason::Store(_))
        ));

        let fatal = AegisError::Transport(TransportError::PeerUnknown("STAGE".to_string()));
        let outcome = TransferOutcome::from_error(&fatal, FailureReason::Forward);
        assert!(outcome.is_fatal());
        assert_eq!(outcome.reason().map(|r| r.code()), Some("forward"));
    }

    #[test]
    fn test_transfer_attempt_construction() {
        let id = ObjectId::new("1.2.3.4").unwrap();
        let attempt = TransferAttempt::new(id.clone(), "ARCHIVE", 1, TransferOutcome::Success);

        assert_eq!(attempt.object_id, id);
        assert_eq!(attempt.destination, "ARCHIVE");
        assert_eq!(attempt.attempt_number, 1);
        assert!(attempt.outcome.is_success());
    }
}
