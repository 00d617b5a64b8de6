//! Archive verification
//!
//! Independently confirms that a transferred object actually reached the
//! archive: an existence query first, then a pull and byte-for-byte
//! comparison when the original bytes are available. Verification never
//! trusts the transfer path's own success report; it asks the archive.
//!
//! Outcomes keep three distinct failure meanings apart: `NotFound` and
//! `Mismatch` mean the backup is bad, `VerificationError` means the check
//! itself could not run. The verifier never retries on its own; whether to
//! re-check is the caller's decision.

use crate::adapters::dicom::status::{classify_status, status_name};
use crate::adapters::dicom::transport::DimseTransport;
use crate::domain::ids::ObjectId;
use crate::domain::model::{BackupTarget, QueryCriteria, QueryLevel, UidSet};
use std::sync::Arc;

use super::digest::digest_bytes;

/// Result of verifying one object against the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The archive copy is intact
    Match,
    /// The archive holds different bytes than were transferred
    Mismatch {
        expected_digest: String,
        actual_digest: String,
    },
    /// The archive has no record of the object
    NotFound,
    /// The check could not run; says nothing about the data
    VerificationError(String),
}

impl VerifyOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, VerifyOutcome::Match)
    }

    /// Stable label for reports and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            VerifyOutcome::Match => "match",
            VerifyOutcome::Mismatch { .. } => "mismatch",
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::VerificationError(_) => "error",
        }
    }
}

/// Queries and pulls from the archive to audit completed transfers.
pub struct Verifier {
    transport: Arc<dyn DimseTransport>,
}

impl Verifier {
    pub fn new(transport: Arc<dyn DimseTransport>) -> Self {
        Self { transport }
    }

    /// Verifies one object on the archive.
    ///
    /// `original_bytes` holds the payload that was transferred, when the
    /// pipeline held it. With bytes, the archive copy is pulled and
    /// compared byte-for-byte; without them (network pushes move
    /// peer-to-peer), verification stops at existence.
    ///
    /// Only archive targets carry a verification obligation; asked about a
    /// staging target, the check refuses rather than pretending.
    pub async fn verify(
        &self,
        object_id: &ObjectId,
        archive: &BackupTarget,
        original_bytes: Option<&[u8]>,
    ) -> VerifyOutcome {
        if !archive.supports_verification() {
            return VerifyOutcome::VerificationError(format!(
                "Target {} is a {} target and cannot be verified against",
                archive.peer(),
                archive.role()
            ));
        }

        let uids = match self.existence(object_id, archive).await {
            Ok(Some(uids)) => uids,
            Ok(None) => {
                tracing::warn!(
                    object_id = %object_id,
                    archive = %archive.peer(),
                    "Archive has no record of transferred object"
                );
                return VerifyOutcome::NotFound;
            }
            Err(detail) => return VerifyOutcome::VerificationError(detail),
        };

        let original = match original_bytes {
            Some(bytes) => bytes,
            None => {
                tracing::debug!(
                    object_id = %object_id,
                    archive = %archive.peer(),
                    "Existence confirmed; no original bytes to compare"
                );
                return VerifyOutcome::Match;
            }
        };

        match self.pull_copy(object_id, archive, &uids).await {
            Ok(copy) => {
                if copy == original {
                    VerifyOutcome::Match
                } else {
                    let expected_digest = digest_bytes(original);
                    let actual_digest = digest_bytes(&copy);
                    tracing::error!(
                        object_id = %object_id,
                        archive = %archive.peer(),
                        expected_digest = %expected_digest,
                        actual_digest = %actual_digest,
                        "Archive copy differs from transferred bytes"
                    );
                    VerifyOutcome::Mismatch {
                        expected_digest,
                        actual_digest,
                    }
                }
            }
            Err(detail) => VerifyOutcome::VerificationError(detail),
        }
    }

    /// Verifies one object against a previously recorded digest.
    ///
    /// Used by the standalone verification sweep, where the transferred
    /// bytes are gone but the run ledger kept their SHA-256. Without a
    /// recorded digest the check stops at existence.
    pub async fn verify_against_digest(
        &self,
        object_id: &ObjectId,
        archive: &BackupTarget,
        expected_digest: Option<&str>,
    ) -> VerifyOutcome {
        if !archive.supports_verification() {
            return VerifyOutcome::VerificationError(format!(
                "Target {} is a {} target and cannot be verified against",
                archive.peer(),
                archive.role()
            ));
        }

        let uids = match self.existence(object_id, archive).await {
            Ok(Some(uids)) => uids,
            Ok(None) => {
                tracing::warn!(
                    object_id = %object_id,
                    archive = %archive.peer(),
                    "Archive has no record of ledgered object"
                );
                return VerifyOutcome::NotFound;
            }
            Err(detail) => return VerifyOutcome::VerificationError(detail),
        };

        let expected = match expected_digest {
            Some(digest) => digest,
            None => {
                tracing::debug!(
                    object_id = %object_id,
                    archive = %archive.peer(),
                    "Existence confirmed; no recorded digest to compare"
                );
                return VerifyOutcome::Match;
            }
        };

        match self.pull_copy(object_id, archive, &uids).await {
            Ok(copy) => {
                let actual_digest = digest_bytes(&copy);
                if actual_digest == expected {
                    VerifyOutcome::Match
                } else {
                    tracing::error!(
                        object_id = %object_id,
                        archive = %archive.peer(),
                        expected_digest = %expected,
                        actual_digest = %actual_digest,
                        "Archive copy no longer matches recorded digest"
                    );
                    VerifyOutcome::Mismatch {
                        expected_digest: expected.to_string(),
                        actual_digest,
                    }
                }
            }
            Err(detail) => VerifyOutcome::VerificationError(detail),
        }
    }

    /// Queries the archive for the object id. `Ok(Some)` carries the
    /// identifier set the archive reported, used for the subsequent pull.
    async fn existence(
        &self,
        object_id: &ObjectId,
        archive: &BackupTarget,
    ) -> Result<Option<UidSet>, String> {
        let criteria = QueryCriteria::at_level(QueryLevel::Image)
            .with_filter("SOPInstanceUID", object_id.as_str());

        let matches = self
            .transport
            .query(archive.peer(), &criteria)
            .await
            .map_err(|e| format!("Existence query for {} failed: {}", object_id, e))?;

        Ok(matches
            .into_iter()
            .find(|uids| uids.instance_uid == object_id.as_str()))
    }

    async fn pull_copy(
        &self,
        object_id: &ObjectId,
        archive: &BackupTarget,
        uids: &UidSet,
    ) -> Result<Vec<u8>, String> {
        let pulled = self
            .transport
            .retrieve_pull(archive.peer(), uids)
            .await
            .map_err(|e| format!("Pull of {} from archive failed: {}", object_id, e))?;

        if !classify_status(pulled.status, 0).is_success() {
            return Err(format!(
                "Pull of {} finished with status 0x{:04X} ({})",
                object_id,
                pulled.status,
                status_name(pulled.status)
            ));
        }

        pulled.payload.ok_or_else(|| {
            format!(
                "Archive reported success pulling {} but returned no payload",
                object_id
            )
        })
    }
}
