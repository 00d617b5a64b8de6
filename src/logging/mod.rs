//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use aegis::logging::init_logging;
//! use aegis::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a backup run
///
/// # Example
///
/// ```no_run
/// use aegis::log_run_start;
/// use aegis::domain::ids::RunId;
///
/// let run_id = RunId::generate();
/// log_run_start!(&run_id, "MAIN_CAMPUS");
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $environment:expr) => {
        tracing::info!(
            run_id = %$run_id,
            environment = %$environment,
            "Starting backup run"
        );
    };
}

/// Log the completion of a backup run
///
/// # Example
///
/// ```no_run
/// use aegis::log_run_complete;
/// use std::time::Duration;
///
/// let succeeded = 42;
/// let failed = 0;
/// let duration = Duration::from_secs(10);
/// log_run_complete!(succeeded, failed, duration);
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($succeeded:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            succeeded = $succeeded,
            failed = $failed,
            duration_ms = $duration.as_millis(),
            "Backup run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use aegis::log_error_with_context;
/// use aegis::domain::AegisError;
///
/// let error = AegisError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress across a batch of records
///
/// # Example
///
/// ```no_run
/// use aegis::log_record_progress;
///
/// log_record_progress!(100, 1000);
/// ```
#[macro_export]
macro_rules! log_record_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing records"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use aegis::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
