//! Verification report structures
//!
//! This module defines the structures for reporting post-transfer
//! verification results.

use crate::domain::ids::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::verify::VerifyOutcome;

/// Verification report containing results of post-transfer auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Total number of objects checked
    pub total_checked: usize,

    /// Number of objects confirmed intact on the archive
    pub matched: usize,

    /// Number of objects whose archive copy differs from the transferred bytes
    pub mismatched: usize,

    /// Number of objects the archive has no record of
    pub missing: usize,

    /// Number of objects whose check could not run
    pub errored: usize,

    /// Number of objects skipped (e.g., verification disabled for the target)
    pub skipped: usize,

    /// Details of every non-matching check
    pub failures: Vec<VerificationFailure>,

    /// Duration of verification in milliseconds
    pub duration_ms: u64,
}

/// Details of a verification that did not confirm the backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// Object that failed the check
    pub object_id: ObjectId,

    /// Outcome label: "mismatch", "not_found", or "error"
    pub kind: String,

    /// Human-readable detail
    pub detail: String,
}

impl VerificationReport {
    /// Create a new verification report
    pub fn new() -> Self {
        Self {
            verified_at: Utc::now(),
            total_checked: 0,
            matched: 0,
            mismatched: 0,
            missing: 0,
            errored: 0,
            skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record the outcome of one object's check
    pub fn record(&mut self, object_id: &ObjectId, outcome: &VerifyOutcome) {
        self.total_checked += 1;
        match outcome {
            VerifyOutcome::Match => self.matched += 1,
            VerifyOutcome::Mismatch {
                expected_digest,
                actual_digest,
            } => {
                self.mismatched += 1;
                self.failures.push(VerificationFailure {
                    object_id: object_id.clone(),
                    kind: outcome.label().to_string(),
                    detail: format!(
                        "expected digest {}, archive returned {}",
                        expected_digest, actual_digest
                    ),
                });
            }
            VerifyOutcome::NotFound => {
                self.missing += 1;
                self.failures.push(VerificationFailure {
                    object_id: object_id.clone(),
                    kind: outcome.label().to_string(),
                    detail: "archive has no record of the object".to_string(),
                });
            }
            VerifyOutcome::VerificationError(detail) => {
                self.errored += 1;
                self.failures.push(VerificationFailure {
                    object_id: object_id.clone(),
                    kind: outcome.label().to_string(),
                    detail: detail.clone(),
                });
            }
        }
    }

    /// Record an object that was not checked
    pub fn record_skip(&mut self) {
        self.total_checked += 1;
        self.skipped += 1;
    }

    /// Set the duration of verification
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Check if every run check confirmed the backup
    pub fn is_clean(&self) -> bool {
        self.mismatched == 0 && self.missing == 0 && self.errored == 0
    }

    /// Get the confirmation rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_checked == 0 {
            return 100.0;
        }
        (self.matched as f64 / self.total_checked as f64) * 100.0
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Duration: {} ms\n", self.duration_ms));
        summary.push_str(&format!("  Total checked: {}\n", self.total_checked));
        summary.push_str(&format!("  ✅ Matched: {}\n", self.matched));
        summary.push_str(&format!("  ❌ Mismatched: {}\n", self.mismatched));
        summary.push_str(&format!("  ❌ Missing: {}\n", self.missing));
        summary.push_str(&format!("  ⚠️  Errored: {}\n", self.errored));
        summary.push_str(&format!("  ⏭️  Skipped: {}\n", self.skipped));
        summary.push_str(&format!("  Success rate: {:.2}%\n", self.success_rate()));

        if !self.failures.is_empty() {
            summary.push_str("\n❌ Failures:\n");
            for (i, failure) in self.failures.iter().enumerate() {
                summary.push_str(&format!("  {}. Object: {}\n", i + 1, failure.object_id));
                summary.push_str(&format!("     Kind: {}\n", failure.kind));
                summary.push_str(&format!("     Detail: {}\n", failure.detail));
            }
        }

        summary
    }
}

impl Default for VerificationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_id() -> ObjectId {
        ObjectId::new("1.2.826.0.1.3680043.10.424.77").unwrap()
    }

    #[test]
    fn test_verification_report_new() {
        let report = VerificationReport::new();
        assert_eq!(report.total_checked, 0);
        assert_eq!(report.matched, 0);
        assert_eq!(report.mismatched, 0);
        assert_eq!(report.missing, 0);
        assert_eq!(report.errored, 0);
        assert_eq!(report.skipped, 0);
        assert!(report.failures.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_record_match() {
        let mut report = VerificationReport::new();
        report.record(&object_id(), &VerifyOutcome::Match);
        report.record(&object_id(), &VerifyOutcome::Match);

        assert_eq!(report.total_checked, 2);
        assert_eq!(report.matched, 2);
        assert!(report.failures.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_record_mismatch_keeps_digests() {
        let mut report = VerificationReport::new();
        report.record(
            &object_id(),
            &VerifyOutcome::Mismatch {
                expected_digest: "abc123".to_string(),
                actual_digest: "def456".to_string(),
            },
        );

        assert_eq!(report.total_checked, 1);
        assert_eq!(report.mismatched, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, "mismatch");
        assert!(report.failures[0].detail.contains("abc123"));
        assert!(report.failures[0].detail.contains("def456"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_record_not_found() {
        let mut report = VerificationReport::new();
        report.record(&object_id(), &VerifyOutcome::NotFound);

        assert_eq!(report.missing, 1);
        assert_eq!(report.failures[0].kind, "not_found");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_record_error_is_not_clean() {
        let mut report = VerificationReport::new();
        report.record(
            &object_id(),
            &VerifyOutcome::VerificationError("gateway down".to_string()),
        );

        assert_eq!(report.errored, 1);
        assert_eq!(report.failures[0].detail, "gateway down");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_record_skip() {
        let mut report = VerificationReport::new();
        report.record_skip();

        assert_eq!(report.total_checked, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_success_rate() {
        let mut report = VerificationReport::new();
        report.record(&object_id(), &VerifyOutcome::Match);
        report.record(&object_id(), &VerifyOutcome::Match);
        report.record(&object_id(), &VerifyOutcome::Match);
        report.record(&object_id(), &VerifyOutcome::NotFound);

        assert_eq!(report.success_rate(), 75.0);
    }

    #[test]
    fn test_success_rate_empty() {
        let report = VerificationReport::new();
        assert_eq!(report.success_rate(), 100.0);
    }

    #[test]
    fn test_format_summary() {
        let mut report = VerificationReport::new();
        report.record(&object_id(), &VerifyOutcome::Match);
        report.record(&object_id(), &VerifyOutcome::Match);
        report.set_duration(1500);

        let summary = report.format_summary();
        assert!(summary.contains("Total checked: 2"));
        assert!(summary.contains("Matched: 2"));
        assert!(summary.contains("Mismatched: 0"));
        assert!(summary.contains("Duration: 1500 ms"));
    }
}
