//! Post-transfer verification
//!
//! Audits completed transfers against the archive: existence queries for
//! every object, pull-and-compare for objects whose original bytes the
//! pipeline held. Verification results are independent of transfer
//! results; a transfer marked succeeded stays succeeded even when its
//! check fails, and the discrepancy is reported instead.

pub mod digest;
pub mod report;
pub mod verify;

pub use digest::digest_bytes;
pub use report::{VerificationFailure, VerificationReport};
pub use verify::{VerifyOutcome, Verifier};
