//! DIMSE transport adapter
//!
//! This module provides the integration with networked query/retrieve
//! peers, mediated by a DIMSE gateway service: the transport trait, the
//! peer status word classification, the gateway HTTP client, and its wire
//! models.

pub mod gateway;
pub mod models;
pub mod status;
pub mod transport;

pub use gateway::GatewayTransport;
pub use status::{classify_status, status_name, StatusClass};
pub use transport::{DimseTransport, PulledObject, PushReport, StoreReport};
