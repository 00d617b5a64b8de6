//! Treatment-delivery database source
//!
//! Enumerates delivered fractions from a relational record-and-verify
//! database and backs each one up by synthesizing a clinical record and
//! routing it through staging. This source never talks to the archive
//! directly; the staging coordinator owns the store-then-forward protocol.

use crate::adapters::database::templates;
use crate::adapters::database::traits::{DatabaseClient, TemplateParam};
use crate::adapters::dicom::transport::DimseTransport;
use crate::config::DatabaseSourceConfig;
use crate::core::staging::StagingCoordinator;
use crate::core::synthesis::RecordSynthesizer;
use crate::domain::model::{
    BackupTarget, CandidateOrigin, CandidateRecord, FailureReason, QueryCriteria, QueryLevel,
    TransferOutcome,
};
use crate::domain::{AegisError, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::traits::{SourceAdapter, TransferReport};

/// Criteria filter carrying the enumeration window in days.
const LOOKBACK_FILTER: &str = "LookbackDays";

/// Source adapter for a treatment-delivery database.
pub struct DatabaseQuerySource {
    name: String,
    client: Arc<dyn DatabaseClient + Send + Sync>,
    synthesizer: RecordSynthesizer,
    coordinator: StagingCoordinator,
    staging: BackupTarget,
    query_template: String,
    lookback_days: u32,
}

impl std::fmt::Debug for DatabaseQuerySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseQuerySource")
            .field("name", &self.name)
            .field("staging", &self.staging)
            .field("query_template", &self.query_template)
            .field("lookback_days", &self.lookback_days)
            .finish_non_exhaustive()
    }
}

impl DatabaseQuerySource {
    /// Builds the adapter for one configured database source.
    ///
    /// `staging` is the holding peer this source stores synthesized records
    /// on; the archive arrives per transfer call.
    pub fn new(
        name: impl Into<String>,
        config: &DatabaseSourceConfig,
        client: Arc<dyn DatabaseClient + Send + Sync>,
        staging: BackupTarget,
        transport: Arc<dyn DimseTransport>,
    ) -> Result<Self> {
        let name = name.into();
        if templates::resolve(&config.query_template).is_none() {
            return Err(AegisError::Configuration(format!(
                "Source {} names unknown query template \"{}\"; known templates: {}",
                name,
                config.query_template,
                templates::names().join(", ")
            )));
        }

        let synthesizer = RecordSynthesizer::new(config)?;

        Ok(Self {
            name,
            client,
            synthesizer,
            coordinator: StagingCoordinator::new(transport),
            staging,
            query_template: config.query_template.clone(),
            lookback_days: config.lookback_days,
        })
    }

    fn lookback_from(&self, criteria: &QueryCriteria) -> u32 {
        criteria
            .filters
            .get(LOOKBACK_FILTER)
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.lookback_days)
    }
}

#[async_trait]
impl SourceAdapter for DatabaseQuerySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "database"
    }

    fn default_criteria(&self) -> QueryCriteria {
        QueryCriteria::at_level(QueryLevel::Image)
            .with_filter("Modality", "RTRECORD")
            .with_filter(LOOKBACK_FILTER, self.lookback_days.to_string())
    }

    async fn find(&self, criteria: &QueryCriteria) -> Result<Vec<CandidateRecord>> {
        let lookback = self.lookback_from(criteria);

        tracing::info!(
            source = %self.name,
            template = %self.query_template,
            lookback_days = lookback,
            "Enumerating delivered fractions"
        );

        let rows = self
            .client
            .execute(&self.query_template, &[TemplateParam::Int(i64::from(lookback))])
            .await
            .map_err(|e| {
                AegisError::Enumeration(format!(
                    "Query template \"{}\" for source {} failed: {}",
                    self.query_template, self.name, e
                ))
            })?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            match self.synthesizer.object_id(&row) {
                Ok(object_id) => {
                    candidates.push(CandidateRecord::database(object_id, row, criteria.clone()));
                }
                Err(e) => {
                    tracing::warn!(
                        source = %self.name,
                        delivery_id = row.delivery_id,
                        error = %e,
                        "Skipping delivery row without a derivable object id"
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
        let row = match &record.origin {
            CandidateOrigin::Database(row) => row,
            CandidateOrigin::Network(_) => {
                return TransferReport::push(TransferOutcome::FatalFailure(
                    FailureReason::Synthesis(format!(
                        "Record {} is network-origin and cannot be synthesized by source {}",
                        record.object_id, self.name
                    )),
                ));
            }
        };

        // Synthesis failures are terminal before any network phase; a
        // defective row never consumes a staging store or forward.
        let synthesized = match self.synthesizer.synthesize(row) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    source = %self.name,
                    object_id = %record.object_id,
                    delivery_id = row.delivery_id,
                    error = %e,
                    "Row could not be synthesized"
                );
                return TransferReport::push(TransferOutcome::from_error(
                    &e,
                    FailureReason::Synthesis,
                ));
            }
        };

        let payload = match synthesized.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                return TransferReport::push(TransferOutcome::from_error(
                    &e,
                    FailureReason::Synthesis,
                ));
            }
        };

        let outcome = self
            .coordinator
            .stage_and_forward(&synthesized, &payload, &self.staging, destination)
            .await;

        TransferReport::synthesized(outcome, payload)
    }

    async fn probe(&self) -> Result<()> {
        self.client.test_connection().await
    }
}
