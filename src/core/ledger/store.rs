//! Durable run-ledger store
//!
//! The ledger is a keyed store (object id -> terminal outcome) persisted as
//! a single JSON document. It is loaded once at run start and rewritten at
//! every terminal transition via a temp-file-then-rename sequence, so a
//! crash mid-write never leaves a truncated ledger on disk.
//!
//! Workers share one [`RunLedger`] behind an `Arc`; the internal mutex
//! serializes terminal writes so concurrent records cannot interleave their
//! persistence.

use crate::core::ledger::entry::LedgerEntry;
use crate::domain::ids::ObjectId;
use crate::domain::{AegisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// On-disk shape of the ledger document
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    entries: BTreeMap<String, LedgerEntry>,
}

/// Append-style keyed store of terminal record outcomes
///
/// "Append" here is logical: each terminal transition inserts or replaces
/// the entry for its object id and persists the whole document atomically.
pub struct RunLedger {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, LedgerEntry>>,
}

impl RunLedger {
    /// Load the ledger from `path`, starting empty if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    /// A corrupt ledger is surfaced rather than silently discarded, since
    /// discarding it would re-transfer every previously backed-up record.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: LedgerDocument = serde_json::from_slice(&bytes).map_err(|e| {
                    AegisError::Ledger(format!(
                        "Ledger file {} is not valid JSON: {}",
                        path.display(),
                        e
                    ))
                })?;
                document.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(AegisError::Ledger(format!(
                    "Failed to read ledger file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            "Loaded run ledger"
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Object ids with a prior `Succeeded` entry.
    ///
    /// The orchestrator filters its candidate set against this at run start
    /// so already-backed-up records are never re-attempted.
    pub async fn succeeded_ids(&self) -> BTreeSet<ObjectId> {
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|e| e.is_succeeded())
            .map(|e| e.object_id.clone())
            .collect()
    }

    /// Look up the entry for one object id.
    pub async fn entry(&self, object_id: &ObjectId) -> Option<LedgerEntry> {
        let entries = self.entries.lock().await;
        entries.get(object_id.as_str()).cloned()
    }

    /// All entries, ordered by object id.
    pub async fn entries(&self) -> Vec<LedgerEntry> {
        let entries = self.entries.lock().await;
        entries.values().cloned().collect()
    }

    /// Number of entries in the ledger.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// True when the ledger holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Record a terminal outcome and persist the ledger.
    ///
    /// Replaces any existing entry for the same object id; a record that
    /// failed in a prior run and succeeds now ends up `Succeeded`. The lock
    /// is held across the write so terminal transitions from concurrent
    /// workers persist one at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub async fn record_terminal(&self, entry: LedgerEntry) -> Result<()> {
        let mut entries = self.entries.lock().await;

        tracing::debug!(
            object_id = %entry.object_id,
            outcome = ?entry.outcome,
            attempts = entry.attempts,
            "Recording terminal outcome"
        );

        entries.insert(entry.object_id.as_str().to_string(), entry);
        self.persist(&entries).await
    }

    /// Write the document to a temp file beside the ledger, then rename it
    /// into place. Callers must hold the entries lock.
    async fn persist(&self, entries: &BTreeMap<String, LedgerEntry>) -> Result<()> {
        let document = LedgerDocument {
            entries: entries.clone(),
        };
        let json = serde_json::to_vec_pretty(&document)
            .map_err(|e| AegisError::Ledger(format!("Failed to serialize ledger: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AegisError::Ledger(format!(
                        "Failed to create ledger directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json).await.map_err(|e| {
            AegisError::Ledger(format!(
                "Failed to write ledger temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        tokio::fs::rename(&temp_path, &self.path).await.map_err(|e| {
            AegisError::Ledger(format!(
                "Failed to move ledger into place at {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
