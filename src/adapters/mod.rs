//! External system integrations for Aegis.
//!
//! This module provides adapters for the systems the pipeline talks to:
//!
//! - [`dicom`] - DIMSE transport trait, status classification, and the
//!   gateway HTTP client that performs query/retrieve/store against peers
//! - [`database`] - Database abstraction layer (trait-based) with the
//!   PostgreSQL implementation for treatment delivery records
//! - [`sources`] - Source adapters: the network query/retrieve source and
//!   the database source, behind one [`sources::SourceAdapter`] trait
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with in-memory doubles. Network I/O sits behind the
//! [`dicom::DimseTransport`] trait, database I/O behind
//! [`database::DatabaseClient`], and the orchestrator sees every source
//! through [`sources::SourceAdapter`]. Each adapter performs exactly one
//! network or database operation per call; retry policy lives with the
//! caller.

pub mod database;
pub mod dicom;
pub mod sources;
