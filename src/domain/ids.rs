//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers that flow
//! through the pipeline. Each type ensures type safety and provides
//! validation for format compliance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Peer identity newtype wrapper
///
/// Represents the application-entity title a networked peer (or this system)
/// is addressed by. The format rules are the DICOM AE title rules: at most
/// 16 characters, printable ASCII, no backslash, not all spaces.
///
/// # Examples
///
/// ```
/// use aegis::domain::ids::PeerId;
/// use std::str::FromStr;
///
/// let peer = PeerId::from_str("ARCHIVE_SCP").unwrap();
/// assert_eq!(peer.as_str(), "ARCHIVE_SCP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Creates a new PeerId from a string
    ///
    /// # Arguments
    ///
    /// * `id` - The peer identity string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PeerId)` if the identity is valid, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Peer identity cannot be empty".to_string());
        }
        if id.len() > 16 {
            return Err(format!(
                "Peer identity cannot exceed 16 characters, got {} ({})",
                id.len(),
                id
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_graphic() || c == ' ')
        {
            return Err(format!(
                "Peer identity must be printable ASCII, got: {}",
                id
            ));
        }
        if id.contains('\\') {
            return Err("Peer identity cannot contain a backslash".to_string());
        }
        Ok(Self(id))
    }

    /// Creates a PeerId from a free-form machine name, truncating to the
    /// 16-character limit. Used when a database column carries a machine
    /// name longer than an identity field allows.
    pub fn from_machine_name(name: &str) -> Result<Self, String> {
        let trimmed = name.trim();
        let truncated: String = trimmed.chars().take(16).collect();
        Self::new(truncated)
    }

    /// Returns the peer identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PeerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PeerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Object identifier newtype wrapper
///
/// Represents the unique instance identifier of one clinical record object,
/// used as the tracking key through enumeration, transfer, retry, ledger,
/// and verification. Format rules follow DICOM UIDs: dot-separated numeric
/// components, at most 64 characters.
///
/// # Examples
///
/// ```
/// use aegis::domain::ids::ObjectId;
/// use std::str::FromStr;
///
/// let id = ObjectId::from_str("1.2.826.0.1.3680043.10.1.42.77").unwrap();
/// assert_eq!(id.as_str(), "1.2.826.0.1.3680043.10.1.42.77");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new ObjectId from a string
    ///
    /// # Arguments
    ///
    /// * `uid` - The object instance identifier
    ///
    /// # Returns
    ///
    /// Returns `Ok(ObjectId)` if the identifier is valid, `Err` otherwise
    pub fn new(uid: impl Into<String>) -> Result<Self, String> {
        let uid = uid.into();
        if uid.trim().is_empty() {
            return Err("Object identifier cannot be empty".to_string());
        }
        if uid.len() > 64 {
            return Err(format!(
                "Object identifier cannot exceed 64 characters, got {}",
                uid.len()
            ));
        }
        if !uid.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(format!(
                "Object identifier must contain only digits and dots, got: {}",
                uid
            ));
        }
        if uid.starts_with('.') || uid.ends_with('.') || uid.contains("..") {
            return Err(format!("Malformed object identifier: {}", uid));
        }
        Ok(Self(uid))
    }

    /// Derives a deterministic ObjectId for a database delivery row.
    ///
    /// The same (root, delivery id) pair always yields the same identifier,
    /// so re-synthesizing a record on a later run maps to the same ledger
    /// key and is filtered as already backed up.
    pub fn derived(root: &str, delivery_id: i64) -> Result<Self, String> {
        Self::new(format!("{}.{}", root, delivery_id))
    }

    /// Returns the object identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Run identifier newtype wrapper
///
/// Every orchestrator invocation gets a fresh run identifier; ledger entries
/// and log events carry it so a run's outcomes can be correlated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generates a new random run identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a RunId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Run identifier cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the run identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RunId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
