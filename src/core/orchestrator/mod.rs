//! Run orchestration
//!
//! This module provides the core backup-run logic for Aegis, including:
//! - The per-record retry loop and its policy
//! - Per-pair session caps
//! - Run coordination and the verification hand-off
//! - Summary and reporting

pub mod coordinator;
pub mod retry;
pub mod sessions;
pub mod summary;

pub use coordinator::Orchestrator;
pub use retry::RetryPolicy;
pub use sessions::SessionGate;
pub use summary::{RunError, RunErrorKind, RunSummary};
