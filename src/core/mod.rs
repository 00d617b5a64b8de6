//! Core business logic for Aegis.
//!
//! This module contains the backup pipeline itself and its orchestration.
//!
//! # Modules
//!
//! - [`orchestrator`] - Run coordination, retry policy, session caps, summary
//! - [`synthesis`] - Record synthesis from treatment delivery rows
//! - [`staging`] - Two-phase store-then-forward for database-origin records
//! - [`ledger`] - Durable run ledger keyed by object id
//! - [`verification`] - Post-transfer verification against the archive
//!
//! # Run Workflow
//!
//! One backup run moves through these steps:
//!
//! 1. **Enumerate**: Ask the source adapter for candidate records
//! 2. **Filter**: Drop ids the ledger already records as `Succeeded`
//! 3. **Cap**: Apply the environment's `max_per_run`, oldest first
//! 4. **Transfer**: Per-record retry loop through the right transfer path
//!    (direct push for network sources; synthesize, stage, and forward for
//!    database sources)
//! 5. **Record**: Write one terminal ledger entry per record
//! 6. **Verify** (optional): Confirm each succeeded record on the archive
//! 7. **Report**: Produce the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//! use aegis::core::orchestrator::Orchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("aegis.toml")?;
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let orchestrator =
//!     Orchestrator::from_config(&config, "MAIN_CAMPUS", None, shutdown_rx).await?;
//! let summary = orchestrator.run().await;
//!
//! println!("Succeeded: {}", summary.succeeded);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod orchestrator;
pub mod staging;
pub mod synthesis;
pub mod verification;
