//! Per-pair session caps
//!
//! Clinical DICOM peers are commonly single-association servers: opening a
//! second session while one is active gets the new association rejected or,
//! worse, wedges the peer. The gate bounds concurrent transfer attempts per
//! (source, destination) pair to the configured limit, independent of how
//! many records the worker pool processes in parallel.

use crate::domain::ids::PeerId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// Bounds concurrent sessions per (source, destination) pair
pub struct SessionGate {
    limit: usize,
    gates: Mutex<BTreeMap<String, Arc<Semaphore>>>,
}

impl SessionGate {
    pub fn new(sessions_per_pair: usize) -> Self {
        Self {
            limit: sessions_per_pair,
            gates: Mutex::new(BTreeMap::new()),
        }
    }

    /// Waits for a session slot toward `destination` on behalf of `source`.
    ///
    /// The permit is held for the duration of one transfer attempt; dropping
    /// it releases the slot. Distinct pairs never block each other.
    pub async fn acquire(&self, source: &str, destination: &PeerId) -> OwnedSemaphorePermit {
        let semaphore = {
            let mut gates = self.gates.lock().await;
            gates
                .entry(format!("{}->{}", source, destination))
                .or_insert_with(|| Arc::new(Semaphore::new(self.limit)))
                .clone()
        };

        semaphore
            .acquire_owned()
            .await
            .expect("session gates are never closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn peer(name: &str) -> PeerId {
        PeerId::new(name).unwrap()
    }

    #[tokio::test]
    async fn single_session_pair_serializes() {
        let gate = SessionGate::new(1);

        let held = gate.acquire("aria", &peer("ARCHIVE_SCP")).await;

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            gate.acquire("aria", &peer("ARCHIVE_SCP")),
        )
        .await;
        assert!(blocked.is_err(), "second acquire should wait");

        drop(held);
        let granted = tokio::time::timeout(
            Duration::from_millis(50),
            gate.acquire("aria", &peer("ARCHIVE_SCP")),
        )
        .await;
        assert!(granted.is_ok(), "released slot should be grantable");
    }

    #[tokio::test]
    async fn distinct_pairs_do_not_block_each_other() {
        let gate = SessionGate::new(1);

        let _aria = gate.acquire("aria", &peer("ARCHIVE_SCP")).await;
        let other = tokio::time::timeout(
            Duration::from_millis(50),
            gate.acquire("mosaiq", &peer("STAGE_SCP")),
        )
        .await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn limit_above_one_admits_that_many() {
        let gate = SessionGate::new(2);

        let _first = gate.acquire("aria", &peer("ARCHIVE_SCP")).await;
        let _second = tokio::time::timeout(
            Duration::from_millis(50),
            gate.acquire("aria", &peer("ARCHIVE_SCP")),
        )
        .await
        .expect("second slot within limit");

        let third = tokio::time::timeout(
            Duration::from_millis(50),
            gate.acquire("aria", &peer("ARCHIVE_SCP")),
        )
        .await;
        assert!(third.is_err(), "third acquire exceeds the limit");
    }
}
