//! Configuration management for Aegis.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation for the backup pipeline.
//!
//! # Overview
//!
//! Aegis uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`AEGIS_*` prefix)
//! - Default values for optional settings
//! - Cross-reference validation (peers, databases, sources, environments)
//! - Type-safe configuration structs with credential protection
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aegis::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("aegis.toml")?;
//!
//! println!("Gateway: {}", config.gateway.base_url);
//! for (name, environment) in &config.environments {
//!     println!("{} -> source '{}', archive '{}'",
//!         name, environment.source, environment.archive);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry-run mode
//! - [`GatewayConfig`] - DIMSE gateway endpoint, auth, TLS, request retries
//! - [`PeerConfig`] - one entry per DICOM peer (sources, archive, staging)
//! - [`DatabaseConfig`] - treatment delivery database connections
//! - [`SourceConfig`] - tagged union of network and database sources
//! - [`EnvironmentConfig`] - named backup environments
//! - [`BackupConfig`] - retry policy and concurrency caps
//! - [`VerificationConfig`] - post-transfer verification toggle
//! - [`LedgerConfig`] - run ledger store location
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [gateway]
//! base_url = "https://dicom-gateway.example.org:8443"
//! calling_aet = "AEGIS"
//! username = "aegis_svc"
//! password = "${AEGIS_GATEWAY_PASSWORD}"
//!
//! [peers.ARIA]
//! aet = "ARIA_QR"
//! host = "aria.example.org"
//! port = 104
//!
//! [peers.ARCHIVE]
//! aet = "ARCHIVE_SCP"
//! host = "archive.example.org"
//! port = 4242
//!
//! [sources.aria]
//! kind = "network"
//! peer = "ARIA"
//! query_level = "series"
//!
//! [environments.MAIN_CAMPUS]
//! source = "aria"
//! archive = "ARCHIVE"
//! ```
//!
//! # Credentials
//!
//! Credential fields hold [`SecretString`] values resolved from the
//! execution environment via `${VAR}` substitution. The value never appears
//! in the file on disk, is redacted from Debug output, and is zeroized when
//! dropped.

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    AegisConfig, ApplicationConfig, BackupConfig, DatabaseConfig, DatabaseSourceConfig,
    Deployment, EnvironmentConfig, GatewayConfig, LedgerConfig, LoggingConfig,
    NetworkSourceConfig, PeerConfig, RetryConfig, SourceConfig, VerificationConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
