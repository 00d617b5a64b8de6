//! Two-phase staging transfer
//!
//! Database-origin records cannot be pushed straight to the archive: the
//! synthesized object only exists in this process, and the archive accepts
//! transfers from registered peers. The staging coordinator first stores
//! the object on the staging peer, then asks staging to push it onward to
//! the archive.
//!
//! The two phases are strictly sequential for one record. A store failure
//! ends the attempt with a `store` reason and the forward phase never runs.
//! A forward failure is reported with a distinct `forward` reason: the
//! object left this process and may sit orphaned on staging, which
//! operational cleanup has to reconcile.

use crate::adapters::dicom::status::{classify_status, status_name};
use crate::adapters::dicom::transport::DimseTransport;
use crate::domain::model::{BackupTarget, FailureReason, TransferOutcome, UidSet};
use crate::domain::record::SynthesizedClinicalRecord;
use std::sync::Arc;

/// Drives the store-then-forward protocol for synthesized records.
pub struct StagingCoordinator {
    transport: Arc<dyn DimseTransport>,
}

impl StagingCoordinator {
    pub fn new(transport: Arc<dyn DimseTransport>) -> Self {
        Self { transport }
    }

    /// Moves one synthesized record to the archive via the staging peer.
    ///
    /// `payload` is the serialized form of `record`, produced once by the
    /// caller so the same bytes reach staging and the verifier. Exactly one
    /// store and at most one forward are attempted; the retry loop above
    /// calls again on transient outcomes.
    pub async fn stage_and_forward(
        &self,
        record: &SynthesizedClinicalRecord,
        payload: &[u8],
        staging: &BackupTarget,
        archive: &BackupTarget,
    ) -> TransferOutcome {
        let outcome = self.store_phase(record, payload, staging).await;
        if !outcome.is_success() {
            return outcome;
        }

        self.forward_phase(record, staging, archive).await
    }

    async fn store_phase(
        &self,
        record: &SynthesizedClinicalRecord,
        payload: &[u8],
        staging: &BackupTarget,
    ) -> TransferOutcome {
        tracing::debug!(
            object_id = %record.object_id,
            staging = %staging.peer(),
            bytes = payload.len(),
            "Storing synthesized record on staging"
        );

        let report = match self
            .transport
            .store(staging.peer(), &record.object_id, payload)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    object_id = %record.object_id,
                    staging = %staging.peer(),
                    error = %e,
                    "Staging store failed before a peer status was obtained"
                );
                return TransferOutcome::from_error(&e, FailureReason::Store);
            }
        };

        classify_status(report.status, 0).into_outcome(|| {
            FailureReason::Store(format!(
                "Staging peer {} rejected store with status 0x{:04X} ({})",
                staging.peer(),
                report.status,
                status_name(report.status)
            ))
        })
    }

    async fn forward_phase(
        &self,
        record: &SynthesizedClinicalRecord,
        staging: &BackupTarget,
        archive: &BackupTarget,
    ) -> TransferOutcome {
        let uids = forward_identifiers(record);

        tracing::debug!(
            object_id = %record.object_id,
            staging = %staging.peer(),
            archive = %archive.peer(),
            "Forwarding stored record from staging to archive"
        );

        let report = match self
            .transport
            .retrieve_push(staging.peer(), &uids, archive.peer())
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(
                    object_id = %record.object_id,
                    staging = %staging.peer(),
                    archive = %archive.peer(),
                    error = %e,
                    "Staging forward failed; a copy may remain on staging"
                );
                return TransferOutcome::from_error(&e, FailureReason::Forward);
            }
        };

        classify_status(report.status, report.failed).into_outcome(|| {
            FailureReason::Forward(format!(
                "Forward from {} to {} finished with status 0x{:04X} ({}), {} failed sub-operations",
                staging.peer(),
                archive.peer(),
                report.status,
                status_name(report.status),
                report.failed
            ))
        })
    }
}

/// Identifier set staging uses to select the just-stored object for the
/// forward push.
fn forward_identifiers(record: &SynthesizedClinicalRecord) -> UidSet {
    UidSet {
        patient_id: Some(record.patient.patient_id.clone()),
        study_uid: Some(record.study.study_uid.clone()),
        series_uid: Some(record.study.series_uid.clone()),
        instance_uid: record.object_id.as_str().to_string(),
    }
}
