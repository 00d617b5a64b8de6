//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the results of
//! one backup run: terminal counts, the ledger delta, run-level errors, and
//! the verification report when a verification pass ran.

use crate::core::ledger::LedgerEntry;
use crate::core::verification::VerificationReport;
use crate::domain::ids::RunId;
use std::time::Duration;

/// Summary of one backup run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Run this summary describes
    pub run_id: RunId,

    /// Named backup environment the run executed against
    pub environment: String,

    /// Source alias records were enumerated from
    pub source: String,

    /// Candidates the source reported before any filtering
    pub enumerated: usize,

    /// Candidates dropped because a prior run already backed them up
    pub skipped_prior_success: usize,

    /// Candidates left `Pending` for a later run (per-run cap or shutdown)
    pub deferred: usize,

    /// Records whose transfer reached the destination
    pub succeeded: usize,

    /// Records that exhausted retries or hit a fatal failure
    pub failed: usize,

    /// The run was cancelled while records were still pending
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Run-level errors (enumeration, ledger persistence, verification setup)
    pub errors: Vec<RunError>,

    /// Ledger entries written by this run, in completion order
    pub ledger_delta: Vec<LedgerEntry>,

    /// Verification report (if a verification pass was run)
    pub verification: Option<VerificationReport>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new(run_id: RunId, environment: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            run_id,
            environment: environment.into(),
            source: source.into(),
            enumerated: 0,
            skipped_prior_success: 0,
            deferred: 0,
            succeeded: 0,
            failed: 0,
            interrupted: false,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            ledger_delta: Vec::new(),
            verification: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a run-level error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Record one record's terminal ledger entry
    pub fn record_terminal(&mut self, entry: LedgerEntry) {
        if entry.is_succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.ledger_delta.push(entry);
    }

    /// Set the verification report
    pub fn set_verification(&mut self, report: VerificationReport) {
        self.verification = Some(report);
    }

    /// Records that reached a terminal outcome in this run
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Verification checks that did not confirm the backup
    pub fn verification_failures(&self) -> usize {
        self.verification
            .as_ref()
            .map(|r| r.mismatched + r.missing + r.errored)
            .unwrap_or(0)
    }

    /// Check if the run completed with nothing to report
    pub fn is_success(&self) -> bool {
        self.failed == 0
            && self.errors.is_empty()
            && !self.interrupted
            && self.verification_failures() == 0
    }

    /// Get the transfer success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed() == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.processed() as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            environment = %self.environment,
            source = %self.source,
            enumerated = self.enumerated,
            skipped_prior_success = self.skipped_prior_success,
            deferred = self.deferred,
            succeeded = self.succeeded,
            failed = self.failed,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Backup run completed"
        );

        if let Some(report) = &self.verification {
            tracing::info!(
                run_id = %self.run_id,
                checked = report.total_checked,
                matched = report.matched,
                mismatched = report.mismatched,
                missing = report.missing,
                errored = report.errored,
                "Verification pass completed"
            );
        }

        if !self.errors.is_empty() {
            tracing::warn!(
                run_id = %self.run_id,
                error_count = self.errors.len(),
                "Run completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    kind = ?error.kind,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or("-"),
                    "Run error"
                );
            }
        }
    }
}

/// Kind of run-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    /// The environment or source could not be resolved
    Configuration,
    /// The source rejected or failed the enumeration query
    Enumeration,
    /// A terminal outcome could not be persisted
    Ledger,
    /// The verification pass could not be set up
    Verification,
    /// Anything else
    Unknown,
}

/// Run-level error with context
#[derive(Debug, Clone)]
pub struct RunError {
    /// Kind of error
    pub kind: RunErrorKind,

    /// Error message
    pub message: String,

    /// Optional context (e.g., object id, source alias)
    pub context: Option<String>,
}

impl RunError {
    /// Create a new run error
    pub fn new(kind: RunErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::ObjectId;

    fn entry_succeeded(n: u32) -> LedgerEntry {
        LedgerEntry::succeeded(
            ObjectId::new(format!("1.2.3.{}", n)).unwrap(),
            RunId::generate(),
            1,
            None,
        )
    }

    fn entry_failed(n: u32) -> LedgerEntry {
        LedgerEntry::failed(
            ObjectId::new(format!("1.2.3.{}", n)).unwrap(),
            RunId::generate(),
            7,
            "push".to_string(),
        )
    }

    fn summary() -> RunSummary {
        RunSummary::new(RunId::generate(), "MAIN_CAMPUS", "aria")
    }

    #[test]
    fn test_run_summary_creation() {
        let summary = summary();

        assert_eq!(summary.enumerated, 0);
        assert_eq!(summary.processed(), 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed, 0);
        assert!(!summary.interrupted);
        assert!(summary.errors.is_empty());
        assert!(summary.ledger_delta.is_empty());
        assert!(summary.is_success());
    }

    #[test]
    fn test_record_terminal_counts_outcomes() {
        let mut summary = summary();
        summary.record_terminal(entry_succeeded(1));
        summary.record_terminal(entry_succeeded(2));
        summary.record_terminal(entry_failed(3));

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed(), 3);
        assert_eq!(summary.ledger_delta.len(), 3);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_success_rate() {
        let mut summary = summary();
        for n in 0..3 {
            summary.record_terminal(entry_succeeded(n));
        }
        summary.record_terminal(entry_failed(9));

        assert_eq!(summary.success_rate(), 75.0);
    }

    #[test]
    fn test_success_rate_empty_run() {
        assert_eq!(summary().success_rate(), 100.0);
    }

    #[test]
    fn test_interrupted_run_is_not_success() {
        let mut summary = summary();
        summary.record_terminal(entry_succeeded(1));
        summary.interrupted = true;

        assert!(!summary.is_success());
    }

    #[test]
    fn test_run_level_error_is_not_success() {
        let mut summary = summary();
        summary.add_error(RunError::new(RunErrorKind::Enumeration, "query rejected"));

        assert!(!summary.is_success());
        assert_eq!(summary.errors[0].kind, RunErrorKind::Enumeration);
    }

    #[test]
    fn test_verification_failures_break_success() {
        use crate::core::verification::VerifyOutcome;

        let mut summary = summary();
        summary.record_terminal(entry_succeeded(1));

        let mut report = VerificationReport::new();
        report.record(&ObjectId::new("1.2.3.1").unwrap(), &VerifyOutcome::NotFound);
        summary.set_verification(report);

        assert_eq!(summary.verification_failures(), 1);
        assert!(!summary.is_success());
        // Transfer bookkeeping is untouched by verification results
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_error_with_context() {
        let error = RunError::new(RunErrorKind::Ledger, "write failed")
            .with_context("object_id=1.2.3.4");

        assert_eq!(error.kind, RunErrorKind::Ledger);
        assert_eq!(error.context.as_deref(), Some("object_id=1.2.3.4"));
    }
}
