// Aegis - Treatment Record Backup Pipeline
// Copyright (c) 2025 Aegis Contributors
// Licensed under the MIT License

//! # Aegis - Treatment Record Backup Pipeline
//!
//! Aegis is a backup orchestration and verification tool built in Rust that
//! moves clinical treatment records from radiotherapy systems into a
//! long-term DICOM archive and then independently confirms the archive
//! actually holds them.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Enumerating** backup candidates from record-and-verify peers and
//!   treatment delivery databases
//! - **Transferring** records to the archive, peer-to-peer for network
//!   sources and via staging for synthesized records
//! - **Retrying** transient failures with capped exponential backoff while
//!   failing fast on fatal peer responses
//! - **Verifying** archived records by existence query and byte comparison
//! - **Recording** terminal outcomes in a run ledger so finished work is
//!   never repeated
//!
//! ## Architecture
//!
//! Aegis follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (orchestrator, synthesis, staging, ledger,
//!   verification)
//! - [`adapters`] - External integrations (DIMSE gateway, delivery
//!   databases, sources)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//! use aegis::core::orchestrator::Orchestrator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("aegis.toml")?;
//!
//!     // Shutdown channel; flip to true to stop issuing new attempts
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     // Build the pipeline for one named environment
//!     let orchestrator =
//!         Orchestrator::from_config(&config, "MAIN_CAMPUS", None, shutdown_rx).await?;
//!
//!     // Execute the run
//!     let summary = orchestrator.run().await;
//!
//!     println!("Backed up {} records", summary.succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Idempotent Runs
//!
//! Aegis records every record's terminal outcome in a JSON run ledger. A
//! record with a `Succeeded` entry is filtered out at the start of the next
//! run, so re-running after a partial failure transfers only what is still
//! missing:
//!
//! ```rust,no_run
//! use aegis::core::ledger::RunLedger;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = RunLedger::load("aegis_ledger.json").await?;
//! let done = ledger.succeeded_ids().await;
//! println!("{} records already archived", done.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Aegis uses the [`domain::AegisError`] type for all errors, following
//! Rust best practices:
//!
//! ```rust,no_run
//! use aegis::domain::AegisError;
//!
//! fn example() -> Result<(), AegisError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = aegis::config::load_config("aegis.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Aegis uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting backup run");
//! warn!(object_id = "1.2.826.0.1.3680043.10.424.77", "Retrying transfer");
//! error!(peer = "ARCHIVE_SCP", "Archive rejected association");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
