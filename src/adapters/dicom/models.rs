//! Gateway wire models
//!
//! This module defines the JSON request and response bodies exchanged with
//! the DIMSE gateway's REST API. The gateway terminates the HTTP side and
//! speaks the DIMSE protocol to the peers it has registered; these models
//! mirror its API exactly and carry no pipeline semantics of their own.

use crate::domain::model::{QueryCriteria, UidSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request body for an echo against one peer.
#[derive(Debug, Clone, Serialize)]
pub struct EchoRequest {
    /// Peer to echo, by its registered identity
    pub peer: String,
    /// Identity we present ourselves as
    pub calling_aet: String,
}

/// Response body for an echo.
#[derive(Debug, Clone, Deserialize)]
pub struct EchoResponse {
    /// Final status word of the echo operation
    pub status: u16,
}

/// Request body for a find (query) against one peer.
#[derive(Debug, Clone, Serialize)]
pub struct FindRequest {
    /// Peer to query, by its registered identity
    pub peer: String,
    /// Identity we present ourselves as
    pub calling_aet: String,
    /// Query granularity: PATIENT, STUDY, SERIES, or IMAGE
    pub level: String,
    /// Attribute filters, keyword to value
    pub filters: BTreeMap<String, String>,
}

impl FindRequest {
    /// Builds a find request from query criteria.
    pub fn from_criteria(peer: &str, calling_aet: &str, criteria: &QueryCriteria) -> Self {
        Self {
            peer: peer.to_string(),
            calling_aet: calling_aet.to_string(),
            level: criteria.level.as_str().to_string(),
            filters: criteria.filters.clone(),
        }
    }
}

/// One match row in a find response.
#[derive(Debug, Clone, Deserialize)]
pub struct FindMatch {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub study_uid: Option<String>,
    #[serde(default)]
    pub series_uid: Option<String>,
    #[serde(default)]
    pub instance_uid: Option<String>,
}

impl FindMatch {
    /// Converts a match row into the domain identifier set.
    ///
    /// Returns `None` when the row carries no instance identifier, which
    /// the caller logs and skips.
    pub fn into_uid_set(self) -> Option<UidSet> {
        let instance_uid = self.instance_uid?;
        if instance_uid.trim().is_empty() {
            return None;
        }
        Some(UidSet {
            patient_id: self.patient_id,
            study_uid: self.study_uid,
            series_uid: self.series_uid,
            instance_uid,
        })
    }
}

/// Response body for a find.
#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse {
    /// Final status word of the find operation
    pub status: u16,
    /// Matches returned by the peer
    #[serde(default)]
    pub matches: Vec<FindMatch>,
}

/// Request body for a retrieve-push (move) operation.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRequest {
    /// Serving peer holding the objects
    pub peer: String,
    /// Identity we present ourselves as
    pub calling_aet: String,
    /// Peer identity the serving peer pushes to
    pub destination: String,
    /// Identifiers selecting the objects to push
    pub identifiers: MoveIdentifiers,
}

/// Identifier set selecting the objects of a move or get.
#[derive(Debug, Clone, Serialize)]
pub struct MoveIdentifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_uid: Option<String>,
    pub instance_uid: String,
}

impl From<&UidSet> for MoveIdentifiers {
    fn from(uids: &UidSet) -> Self {
        Self {
            patient_id: uids.patient_id.clone(),
            study_uid: uids.study_uid.clone(),
            series_uid: uids.series_uid.clone(),
            instance_uid: uids.instance_uid.clone(),
        }
    }
}

/// Response body for a move: the final status and sub-operation counts
/// reported by the serving peer.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveResponse {
    pub status: u16,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub warnings: u32,
}

/// Request body for a retrieve-pull (get) operation.
#[derive(Debug, Clone, Serialize)]
pub struct GetRequest {
    /// Serving peer holding the object
    pub peer: String,
    /// Identity we present ourselves as
    pub calling_aet: String,
    /// Identifiers selecting the object to pull
    pub identifiers: MoveIdentifiers,
}

/// Response body for a get. The payload is base64-encoded object bytes,
/// absent when the peer returned no object.
#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    pub status: u16,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Request body for a store operation. The payload is base64-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct StoreRequest {
    /// Receiving peer
    pub peer: String,
    /// Identity we present ourselves as
    pub calling_aet: String,
    /// Instance identifier of the object being stored
    pub object_id: String,
    /// Base64-encoded object bytes
    pub payload: String,
}

/// Response body for a store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreResponse {
    pub status: u16,
}

/// Response body of the gateway health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Error body the gateway attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl GatewayErrorBody {
    /// Flattens the error body into one message line.
    pub fn message(&self) -> String {
        match (&self.error, &self.detail) {
            (Some(e), Some(d)) => format!("{e}: {d}"),
            (Some(e), None) => e.clone(),
            (None, Some(d)) => d.clone(),
            (None, None) => "unspecified gateway error".to_string(),
        }
    }
}
