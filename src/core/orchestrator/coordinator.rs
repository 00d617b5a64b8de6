//! Backup orchestrator - main run loop of the pipeline
//!
//! This module drives one backup run end to end: enumeration, ledger
//! filtering, the per-record retry loop, terminal bookkeeping, and the
//! post-transfer verification pass. Records are independent units of work;
//! the orchestrator processes them through a bounded worker pool while the
//! session gate keeps concurrent attempts within what the peers tolerate.

use crate::adapters::dicom::{DimseTransport, GatewayTransport};
use crate::adapters::sources::{
    create_source_adapter, resolve_archive_target, SourceAdapter, TransferReport,
};
use crate::config::schema::{AegisConfig, BackupConfig};
use crate::core::ledger::{LedgerEntry, RunLedger};
use crate::core::verification::{VerificationReport, Verifier};
use crate::domain::ids::{ObjectId, RunId};
use crate::domain::model::{
    BackupTarget, CandidateRecord, FailureReason, TransferAttempt, TransferOutcome,
};
use crate::domain::{AegisError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use super::retry::RetryPolicy;
use super::sessions::SessionGate;
use super::summary::{RunError, RunErrorKind, RunSummary};

/// What one record's retry loop produced
struct RecordTerminal {
    entry: LedgerEntry,
    /// Transferred bytes for verification; only kept for succeeded records
    payload: Option<Vec<u8>>,
    /// Error persisting the terminal entry, surfaced as a run-level error
    ledger_error: Option<AegisError>,
}

/// Drives one backup run for one environment
pub struct Orchestrator {
    environment: String,
    source: Arc<dyn SourceAdapter>,
    archive: BackupTarget,
    ledger: Arc<RunLedger>,
    verifier: Option<Verifier>,
    policy: RetryPolicy,
    sessions: SessionGate,
    parallel_records: usize,
    max_per_run: Option<usize>,
    shutdown: watch::Receiver<bool>,
}

impl Orchestrator {
    /// Wire an orchestrator from already-resolved parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        environment: impl Into<String>,
        source: Arc<dyn SourceAdapter>,
        archive: BackupTarget,
        ledger: Arc<RunLedger>,
        verifier: Option<Verifier>,
        backup: &BackupConfig,
        max_per_run: Option<usize>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            environment: environment.into(),
            source,
            archive,
            ledger,
            verifier,
            policy: RetryPolicy::from_config(backup),
            sessions: SessionGate::new(backup.sessions_per_pair),
            parallel_records: backup.parallel_records,
            max_per_run,
            shutdown,
        }
    }

    /// Resolve a named environment from configuration and build the
    /// orchestrator for it: gateway transport, source adapter, archive
    /// target, ledger, and verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment or source is not configured,
    /// the transport cannot be constructed, or the ledger cannot be loaded.
    pub async fn from_config(
        config: &AegisConfig,
        environment_name: &str,
        source_override: Option<&str>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let environment = config.environment(environment_name).ok_or_else(|| {
            AegisError::Configuration(format!(
                "Environment '{}' is not defined. Available: {}",
                environment_name,
                config
                    .environments
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

        let source_alias = source_override.unwrap_or(&environment.source);

        let mut gateway_config = config.gateway.clone();
        if let Some(aet) = &environment.calling_aet {
            gateway_config.calling_aet = aet.clone();
        }
        let transport: Arc<dyn DimseTransport> = Arc::new(GatewayTransport::new(gateway_config)?);

        let source = create_source_adapter(config, source_alias, transport.clone()).await?;
        let archive = resolve_archive_target(config, &environment.archive)?;
        let ledger = Arc::new(RunLedger::load(&config.ledger.path).await?);

        let verifier = config
            .verification
            .enable_verification
            .then(|| Verifier::new(transport));

        Ok(Self::new(
            environment_name,
            source,
            archive,
            ledger,
            verifier,
            &config.backup,
            environment.max_per_run,
            shutdown,
        ))
    }

    /// Execute one backup run.
    ///
    /// Every outcome ends up in the returned summary; record-level failures
    /// never abort the run, and a failed enumeration ends it with zero
    /// processed records and a run-level error. Cancellation stops new
    /// attempts immediately while records already in flight drain to a
    /// terminal outcome, so the ledger never holds a record mid-attempt.
    pub async fn run(&self) -> RunSummary {
        let start = Instant::now();
        let run_id = RunId::generate();
        let mut summary = RunSummary::new(run_id.clone(), &self.environment, self.source.name());

        tracing::info!(
            run_id = %run_id,
            environment = %self.environment,
            source = self.source.name(),
            source_kind = self.source.kind(),
            archive = %self.archive,
            "Starting backup run"
        );

        let criteria = self.source.default_criteria();
        let candidates = match self.source.find(&criteria).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!(
                    run_id = %run_id,
                    source = self.source.name(),
                    error = %e,
                    "Enumeration failed; abandoning run with zero processed records"
                );
                summary.add_error(
                    RunError::new(RunErrorKind::Enumeration, e.to_string())
                        .with_context(format!("source={}", self.source.name())),
                );
                return Self::finish(summary, start);
            }
        };

        summary.enumerated = candidates.len();
        if candidates.is_empty() {
            tracing::info!(run_id = %run_id, "Source reported no matching records");
            return Self::finish(summary, start);
        }

        let prior_succeeded = self.ledger.succeeded_ids().await;
        let mut pending: Vec<CandidateRecord> = candidates
            .into_iter()
            .filter(|candidate| !prior_succeeded.contains(&candidate.object_id))
            .collect();
        summary.skipped_prior_success = summary.enumerated - pending.len();

        if let Some(cap) = self.max_per_run {
            if pending.len() > cap {
                summary.deferred = pending.len() - cap;
                pending.truncate(cap);
                tracing::info!(
                    run_id = %run_id,
                    cap = cap,
                    deferred = summary.deferred,
                    "Capped run to max_per_run; remainder stays pending for the next run"
                );
            }
        }

        tracing::info!(
            run_id = %run_id,
            to_process = pending.len(),
            skipped_prior_success = summary.skipped_prior_success,
            parallel_records = self.parallel_records,
            "Dispatching records"
        );

        let results: Vec<Option<RecordTerminal>> = stream::iter(pending)
            .map(|record| self.process_record(record, &run_id))
            .buffer_unordered(self.parallel_records)
            .collect()
            .await;

        let mut verifiable: Vec<(ObjectId, Option<Vec<u8>>)> = Vec::new();
        for result in results {
            match result {
                Some(terminal) => {
                    if let Some(e) = terminal.ledger_error {
                        summary.add_error(
                            RunError::new(RunErrorKind::Ledger, e.to_string())
                                .with_context(format!("object_id={}", terminal.entry.object_id)),
                        );
                    }
                    if terminal.entry.is_succeeded() {
                        verifiable.push((terminal.entry.object_id.clone(), terminal.payload));
                    }
                    summary.record_terminal(terminal.entry);
                }
                None => summary.deferred += 1,
            }
        }

        summary.interrupted = *self.shutdown.borrow();

        if !summary.interrupted {
            if let Some(verifier) = &self.verifier {
                if self.archive.supports_verification() && !verifiable.is_empty() {
                    let (report, cut_short) = self.verify_succeeded(verifier, &verifiable).await;
                    summary.interrupted = cut_short;
                    summary.set_verification(report);
                }
            }
        }

        Self::finish(summary, start)
    }

    /// One record's full retry loop, ending in exactly one terminal outcome.
    ///
    /// Returns `None` when shutdown was requested before the first attempt;
    /// the record stays pending with no ledger entry.
    async fn process_record(
        &self,
        record: CandidateRecord,
        run_id: &RunId,
    ) -> Option<RecordTerminal> {
        if *self.shutdown.borrow() {
            tracing::info!(
                object_id = %record.object_id,
                "Shutdown requested; leaving record pending"
            );
            return None;
        }

        let mut attempt: u32 = 1;
        let mut payload: Option<Vec<u8>> = None;

        let (outcome, attempts_used) = loop {
            let report = {
                let _session = self
                    .sessions
                    .acquire(self.source.name(), self.archive.peer())
                    .await;

                match tokio::time::timeout(
                    self.policy.attempt_timeout,
                    self.source.transfer(&record, &self.archive),
                )
                .await
                {
                    Ok(report) => report,
                    Err(_) => TransferReport::push(TransferOutcome::TransientFailure(
                        FailureReason::Timeout(format!(
                            "Attempt did not finish within {}s",
                            self.policy.attempt_timeout.as_secs()
                        )),
                    )),
                }
            };

            let attempted = TransferAttempt::new(
                record.object_id.clone(),
                self.archive.peer().as_str(),
                attempt,
                report.outcome.clone(),
            );
            tracing::debug!(
                object_id = %attempted.object_id,
                destination = %attempted.destination,
                attempt = attempted.attempt_number,
                outcome = ?attempted.outcome,
                "Transfer attempt finished"
            );

            if report.payload.is_some() {
                payload = report.payload;
            }

            match report.outcome {
                TransferOutcome::Success => break (TransferOutcome::Success, attempt),
                TransferOutcome::FatalFailure(reason) => {
                    tracing::error!(
                        object_id = %record.object_id,
                        reason = %reason,
                        "Fatal transfer failure; not retrying"
                    );
                    break (TransferOutcome::FatalFailure(reason), attempt);
                }
                TransferOutcome::TransientFailure(reason) => {
                    if self.policy.is_final_attempt(attempt) {
                        tracing::error!(
                            object_id = %record.object_id,
                            attempts = attempt,
                            reason = %reason,
                            "Retries exhausted"
                        );
                        break (TransferOutcome::TransientFailure(reason), attempt);
                    }
                    if *self.shutdown.borrow() {
                        tracing::info!(
                            object_id = %record.object_id,
                            attempts = attempt,
                            "Shutdown requested; not issuing further attempts"
                        );
                        break (TransferOutcome::TransientFailure(reason), attempt);
                    }

                    let delay = self.policy.delay_before(attempt + 1);
                    tracing::warn!(
                        object_id = %record.object_id,
                        attempt = attempt,
                        next_attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        reason = %reason,
                        "Transient transfer failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        };

        let entry = match &outcome {
            TransferOutcome::Success => LedgerEntry::succeeded(
                record.object_id.clone(),
                run_id.clone(),
                attempts_used,
                payload
                    .as_deref()
                    .map(crate::core::verification::digest_bytes),
            ),
            failed => LedgerEntry::failed(
                record.object_id.clone(),
                run_id.clone(),
                attempts_used,
                failed
                    .reason()
                    .map(|r| r.code().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        };
        let succeeded = entry.is_succeeded();

        let ledger_error = self.ledger.record_terminal(entry.clone()).await.err();
        if let Some(e) = &ledger_error {
            tracing::error!(
                object_id = %record.object_id,
                error = %e,
                "Failed to persist terminal outcome"
            );
        }

        Some(RecordTerminal {
            entry,
            payload: succeeded.then_some(payload).flatten(),
            ledger_error,
        })
    }

    /// Verification pass over this run's succeeded records.
    ///
    /// The second return value is true when shutdown cut the pass short.
    async fn verify_succeeded(
        &self,
        verifier: &Verifier,
        verifiable: &[(ObjectId, Option<Vec<u8>>)],
    ) -> (VerificationReport, bool) {
        tracing::info!(
            records = verifiable.len(),
            archive = %self.archive,
            "Running post-transfer verification"
        );

        let start = Instant::now();
        let mut report = VerificationReport::new();
        let mut cut_short = false;

        for (index, (object_id, payload)) in verifiable.iter().enumerate() {
            if *self.shutdown.borrow() {
                for _ in index..verifiable.len() {
                    report.record_skip();
                }
                cut_short = true;
                tracing::info!(
                    skipped = verifiable.len() - index,
                    "Shutdown requested; skipping remaining verification checks"
                );
                break;
            }

            let outcome = verifier
                .verify(object_id, &self.archive, payload.as_deref())
                .await;
            report.record(object_id, &outcome);
        }

        report.set_duration(start.elapsed().as_millis() as u64);
        (report, cut_short)
    }

    fn finish(summary: RunSummary, start: Instant) -> RunSummary {
        let summary = summary.with_duration(start.elapsed());
        summary.log_summary();
        summary
    }
}
