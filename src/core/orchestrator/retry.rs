//! Per-record retry policy
//!
//! Transfer attempts for one record run sequentially: at most
//! `max_retries` attempts, each bounded by an independent timeout, with
//! exponential backoff plus jitter between attempts. Fatal failures stop
//! the loop immediately regardless of attempts remaining.

use crate::config::schema::BackupConfig;
use rand::Rng;
use std::time::Duration;

/// Retry parameters for one record's transfer loop
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per record (1..=max)
    pub max_retries: u32,

    /// Independent timeout applied to each attempt
    pub attempt_timeout: Duration,

    initial_delay_ms: u64,
    max_delay_ms: u64,
    backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &BackupConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_seconds),
            initial_delay_ms: config.initial_delay_ms,
            max_delay_ms: config.max_delay_ms,
            backoff_multiplier: config.backoff_multiplier,
        }
    }

    /// Delay to sleep before issuing `next_attempt` (2..=max_retries).
    ///
    /// Exponential from the initial delay, capped at the maximum, with up
    /// to 25% random jitter so parallel records retrying against the same
    /// peer do not thunder in step.
    pub fn delay_before(&self, next_attempt: u32) -> Duration {
        let exponent = next_attempt.saturating_sub(2);
        let base_ms = (self.initial_delay_ms as f64
            * self.backoff_multiplier.powi(exponent as i32))
        .min(self.max_delay_ms as f64);

        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        let delay_ms = (base_ms * (1.0 + jitter)).min(self.max_delay_ms as f64);

        Duration::from_millis(delay_ms as u64)
    }

    /// True when `attempt` was the last permitted attempt.
    pub fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }
}
