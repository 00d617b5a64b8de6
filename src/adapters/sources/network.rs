//! Network query/retrieve source
//!
//! Wraps one query/retrieve peer (a record-and-verify system or a
//! treatment-planning server). Enumeration is a find at the configured
//! granularity; transfer is a retrieve-push naming the archive as the push
//! destination, so the payload moves peer-to-peer and never enters this
//! process.

use crate::adapters::dicom::status::{classify_status, status_name};
use crate::adapters::dicom::transport::DimseTransport;
use crate::config::NetworkSourceConfig;
use crate::domain::ids::{ObjectId, PeerId};
use crate::domain::model::{
    BackupTarget, CandidateOrigin, CandidateRecord, FailureReason, QueryCriteria, QueryLevel,
    TransferOutcome,
};
use crate::domain::{AegisError, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{SourceAdapter, TransferReport};

/// Source adapter for a networked query/retrieve peer.
pub struct NetworkQuerySource {
    name: String,
    peer: PeerId,
    criteria: QueryCriteria,
    transport: Arc<dyn DimseTransport>,
}

impl std::fmt::Debug for NetworkQuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkQuerySource")
            .field("name", &self.name)
            .field("peer", &self.peer)
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

impl NetworkQuerySource {
    /// Builds the adapter for one configured network source.
    ///
    /// `peer` is the resolved identity of the serving peer; the factory
    /// looks it up from the peer table the source's alias points at.
    pub fn new(
        name: impl Into<String>,
        peer: PeerId,
        config: &NetworkSourceConfig,
        transport: Arc<dyn DimseTransport>,
    ) -> Result<Self> {
        let name = name.into();
        let level: QueryLevel = config.query_level.parse().map_err(|e| {
            AegisError::Configuration(format!("Source {} has an invalid query level: {}", name, e))
        })?;

        let mut criteria =
            QueryCriteria::at_level(level).with_filter("Modality", config.modality.clone());
        for (attribute, value) in &config.filters {
            criteria = criteria.with_filter(attribute.clone(), value.clone());
        }

        Ok(Self {
            name,
            peer,
            criteria,
            transport,
        })
    }
}

#[async_trait]
impl SourceAdapter for NetworkQuerySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "network"
    }

    fn default_criteria(&self) -> QueryCriteria {
        self.criteria.clone()
    }

    async fn find(&self, criteria: &QueryCriteria) -> Result<Vec<CandidateRecord>> {
        tracing::info!(
            source = %self.name,
            peer = %self.peer,
            level = criteria.level.as_str(),
            "Enumerating candidates from network source"
        );

        let uid_sets = self
            .transport
            .query(&self.peer, criteria)
            .await
            .map_err(|e| {
                AegisError::Enumeration(format!(
                    "Query against {} for source {} failed: {}",
                    self.peer, self.name, e
                ))
            })?;

        let mut candidates = Vec::with_capacity(uid_sets.len());
        for uids in uid_sets {
            match ObjectId::new(uids.instance_uid.clone()) {
                Ok(object_id) => {
                    candidates.push(CandidateRecord::network(object_id, uids, criteria.clone()));
                }
                Err(e) => {
                    tracing::warn!(
                        source = %self.name,
                        instance_uid = %uids.instance_uid,
                        error = %e,
                        "Skipping match with an unusable instance identifier"
                    );
                }
            }
        }

        tracing::info!(
            source = %self.name,
            candidates = candidates.len(),
            "Enumeration complete"
        );
        Ok(candidates)
    }

    async fn transfer(
        &self,
        record: &CandidateRecord,
        destination: &BackupTarget,
    ) -> TransferReport {
        let uids = match &record.origin {
            CandidateOrigin::Network(uids) => uids,
            CandidateOrigin::Database(_) => {
                return TransferReport::push(TransferOutcome::FatalFailure(FailureReason::Push(
                    format!(
                        "Record {} is database-origin and cannot be pushed by source {}",
                        record.object_id, self.name
                    ),
                )));
            }
        };

        tracing::debug!(
            source = %self.name,
            object_id = %record.object_id,
            destination = %destination.peer(),
            "Requesting push to archive"
        );

        let report = match self
            .transport
            .retrieve_push(&self.peer, uids, destination.peer())
            .await
        {
            Ok(report) => report,
            Err(e) => {
                return TransferReport::push(TransferOutcome::from_error(
                    &e,
                    FailureReason::Transport,
                ));
            }
        };

        let outcome = classify_status(report.status, report.failed).into_outcome(|| {
            FailureReason::Push(format!(
                "Push of {} from {} finished with status 0x{:04X} ({}), {} failed sub-operations",
                record.object_id,
                self.peer,
                report.status,
                status_name(report.status),
                report.failed
            ))
        });

        TransferReport::push(outcome)
    }

    async fn probe(&self) -> Result<()> {
        self.transport.echo(&self.peer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dicom::transport::{PulledObject, PushReport, StoreReport};
    use crate::domain::model::UidSet;
    use crate::domain::TransportError;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct StubTransport {
        query_result: Mutex<Option<Result<Vec<UidSet>>>>,
        push_result: Mutex<Option<Result<PushReport>>>,
    }

    impl StubTransport {
        fn with_query(result: Result<Vec<UidSet>>) -> Self {
            Self {
                query_result: Mutex::new(Some(result)),
                push_result: Mutex::new(None),
            }
        }

        fn with_push(result: Result<PushReport>) -> Self {
            Self {
                query_result: Mutex::new(None),
                push_result: Mutex::new(Some(result)),
            }
        }
    }

    #[async_trait]
    impl DimseTransport for StubTransport {
        async fn echo(&self, _peer: &PeerId) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _peer: &PeerId, _criteria: &QueryCriteria) -> Result<Vec<UidSet>> {
            self.query_result.lock().unwrap().take().unwrap()
        }

        async fn retrieve_push(
            &self,
            _peer: &PeerId,
            _uids: &UidSet,
            _destination: &PeerId,
        ) -> Result<PushReport> {
            self.push_result.lock().unwrap().take().unwrap()
        }

        async fn retrieve_pull(&self, _peer: &PeerId, _uids: &UidSet) -> Result<PulledObject> {
            unimplemented!("not used by network source")
        }

        async fn store(
            &self,
            _peer: &PeerId,
            _object_id: &ObjectId,
            _payload: &[u8],
        ) -> Result<StoreReport> {
            unimplemented!("not used by network source")
        }
    }

    fn source_config() -> NetworkSourceConfig {
        NetworkSourceConfig {
            peer: "TPS".to_string(),
            query_level: "image".to_string(),
            modality: "RTRECORD".to_string(),
            filters: BTreeMap::new(),
        }
    }

    fn tps_peer() -> PeerId {
        PeerId::new("TPS_SCP").unwrap()
    }

    fn uid_set(instance: &str) -> UidSet {
        UidSet {
            patient_id: Some("MRN-1".to_string()),
            study_uid: Some("1.2.3".to_string()),
            series_uid: Some("1.2.3.1".to_string()),
            instance_uid: instance.to_string(),
        }
    }

    fn archive() -> BackupTarget {
        BackupTarget::archive(PeerId::new("ARCHIVE_SCP").unwrap(), "10.0.4.21", 104)
    }

    #[test]
    fn default_criteria_carries_modality_and_level() {
        let transport = Arc::new(StubTransport::with_query(Ok(Vec::new())));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let criteria = source.default_criteria();
        assert_eq!(criteria.level, QueryLevel::Image);
        assert_eq!(criteria.filters.get("Modality"), Some(&"RTRECORD".to_string()));
    }

    #[test]
    fn invalid_query_level_is_a_configuration_error() {
        let mut config = source_config();
        config.query_level = "volume".to_string();
        let transport = Arc::new(StubTransport::with_query(Ok(Vec::new())));

        let err = NetworkQuerySource::new("tps", tps_peer(), &config, transport).unwrap_err();
        assert!(matches!(err, AegisError::Configuration(_)));
    }

    #[tokio::test]
    async fn find_maps_matches_and_skips_bad_uids() {
        let transport = Arc::new(StubTransport::with_query(Ok(vec![
            uid_set("1.2.826.0.1.1"),
            uid_set("not a uid"),
            uid_set("1.2.826.0.1.2"),
        ])));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let candidates = source.find(&source.default_criteria()).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].object_id.as_str(), "1.2.826.0.1.1");
        assert_eq!(candidates[1].object_id.as_str(), "1.2.826.0.1.2");
    }

    #[tokio::test]
    async fn find_failure_is_an_enumeration_error() {
        let transport = Arc::new(StubTransport::with_query(Err(AegisError::Transport(
            TransportError::OperationFailed("find rejected".to_string()),
        ))));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let err = source.find(&source.default_criteria()).await.unwrap_err();
        assert!(matches!(err, AegisError::Enumeration(_)));
    }

    #[tokio::test]
    async fn clean_push_is_success_without_payload() {
        let transport = Arc::new(StubTransport::with_push(Ok(PushReport {
            status: 0x0000,
            completed: 1,
            failed: 0,
            warnings: 0,
        })));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let record = CandidateRecord::network(
            ObjectId::new("1.2.826.0.1.1").unwrap(),
            uid_set("1.2.826.0.1.1"),
            source.default_criteria(),
        );
        let report = source.transfer(&record, &archive()).await;

        assert!(report.is_success());
        assert!(report.payload.is_none());
    }

    #[tokio::test]
    async fn partial_push_is_transient_with_push_reason() {
        let transport = Arc::new(StubTransport::with_push(Ok(PushReport {
            status: 0xB000,
            completed: 1,
            failed: 1,
            warnings: 1,
        })));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let record = CandidateRecord::network(
            ObjectId::new("1.2.826.0.1.1").unwrap(),
            uid_set("1.2.826.0.1.1"),
            source.default_criteria(),
        );
        let report = source.transfer(&record, &archive()).await;

        assert!(matches!(
            report.outcome,
            TransferOutcome::TransientFailure(FailureReason::Push(_))
        ));
    }

    #[tokio::test]
    async fn transport_error_keeps_transport_reason() {
        let transport = Arc::new(StubTransport::with_push(Err(AegisError::Transport(
            TransportError::ConnectionFailed("gateway down".to_string()),
        ))));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let record = CandidateRecord::network(
            ObjectId::new("1.2.826.0.1.1").unwrap(),
            uid_set("1.2.826.0.1.1"),
            source.default_criteria(),
        );
        let report = source.transfer(&record, &archive()).await;

        assert!(matches!(
            report.outcome,
            TransferOutcome::TransientFailure(FailureReason::Transport(_))
        ));
    }

    #[tokio::test]
    async fn destination_unknown_is_fatal() {
        let transport = Arc::new(StubTransport::with_push(Ok(PushReport {
            status: 0xA801,
            completed: 0,
            failed: 0,
            warnings: 0,
        })));
        let source = NetworkQuerySource::new("tps", tps_peer(), &source_config(), transport).unwrap();

        let record = CandidateRecord::network(
            ObjectId::new("1.2.826.0.1.1").unwrap(),
            uid_set("1.2.826.0.1.1"),
            source.default_criteria(),
        );
        let report = source.transfer(&record, &archive()).await;

        assert!(report.outcome.is_fatal());
        assert_eq!(report.outcome.reason().map(|r| r.code()), Some("push"));
    }
}
