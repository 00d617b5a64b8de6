//! Peer status word classification
//!
//! Retrieve and store operations finish with a 16-bit status word reported
//! by the remote peer. Every status word maps into exactly one
//! [`StatusClass`], which decides whether the orchestrator counts the
//! attempt as done, queues a retry, or abandons the record. The mapping
//! lives in one place so the push, pull, and store paths cannot drift
//! apart in how they read the same wire value.

use crate::domain::TransferOutcome;

/// Success status word.
pub const STATUS_SUCCESS: u16 = 0x0000;

/// Operation cancelled by the peer or an intermediary.
pub const STATUS_CANCELLED: u16 = 0xFE00;

/// Push destination not known to the serving peer.
pub const STATUS_DESTINATION_UNKNOWN: u16 = 0xA801;

/// Object class not supported by the receiving peer.
pub const STATUS_CLASS_NOT_SUPPORTED: u16 = 0x0122;

/// Disposition of one finished transfer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Operation completed, every sub-operation succeeded
    Success,
    /// Operation failed in a way worth retrying
    Transient,
    /// Operation failed in a way retrying cannot fix
    Fatal,
}

impl StatusClass {
    /// Converts the class into the outcome the orchestrator records,
    /// attaching `reason` to the failure arms.
    pub fn into_outcome(self, reason: impl FnOnce() -> crate::domain::FailureReason) -> TransferOutcome {
        match self {
            StatusClass::Success => TransferOutcome::Success,
            StatusClass::Transient => TransferOutcome::TransientFailure(reason()),
            StatusClass::Fatal => TransferOutcome::FatalFailure(reason()),
        }
    }

    /// Returns true for the success arm.
    pub fn is_success(&self) -> bool {
        matches!(self, StatusClass::Success)
    }
}

/// Classifies a peer-reported status word together with the reported
/// failed sub-operation count.
///
/// A status of `0x0000` only counts as success when zero sub-operations
/// failed; a "successful" push that silently dropped objects is a partial
/// failure and must be retried. Warning-class statuses (`0xB000`-`0xBFFF`)
/// are likewise partial: some objects moved, some did not, and re-pushing
/// is safe. Unknown status words are treated as transient so an unfamiliar
/// peer implementation degrades to retries instead of data loss.
pub fn classify_status(status: u16, failed_sub_ops: u32) -> StatusClass {
    let class = match status {
        STATUS_SUCCESS => {
            if failed_sub_ops == 0 {
                StatusClass::Success
            } else {
                StatusClass::Transient
            }
        }
        0xB000..=0xBFFF => StatusClass::Transient,
        STATUS_CANCELLED => StatusClass::Transient,
        0xA700..=0xA7FF => StatusClass::Transient,
        STATUS_DESTINATION_UNKNOWN => StatusClass::Fatal,
        0xA900..=0xA9FF => StatusClass::Fatal,
        0xC000..=0xCFFF => StatusClass::Fatal,
        STATUS_CLASS_NOT_SUPPORTED => StatusClass::Fatal,
        // Pending statuses leaking into a final response mean the peer
        // never finished; retry rather than trust it.
        0xFF00 | 0xFF01 => StatusClass::Transient,
        other => {
            tracing::warn!(
                status = format!("0x{other:04X}"),
                "Unrecognized peer status word, treating as transient"
            );
            StatusClass::Transient
        }
    };

    // A non-zero failure count can never ride along with Success, even if
    // a peer pairs it with a status word we read as successful.
    if failed_sub_ops > 0 && class.is_success() {
        StatusClass::Transient
    } else {
        class
    }
}

/// Human-readable name for a status word, for log lines and reports.
pub fn status_name(status: u16) -> &'static str {
    match status {
        STATUS_SUCCESS => "success",
        0xB000..=0xBFFF => "warning",
        STATUS_CANCELLED => "cancelled",
        0xA700..=0xA7FF => "out of resources",
        STATUS_DESTINATION_UNKNOWN => "destination unknown",
        0xA900..=0xA9FF => "identifier mismatch",
        0xC000..=0xCFFF => "unable to process",
        STATUS_CLASS_NOT_SUPPORTED => "class not supported",
        0xFF00 | 0xFF01 => "pending",
        _ => "unrecognized",
    }
}
