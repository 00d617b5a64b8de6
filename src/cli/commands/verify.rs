//! Verify command implementation
//!
//! This module implements the `verify` command: a standalone sweep that
//! re-checks every record the ledger holds as succeeded against the
//! archive, without transferring anything. Existence is always checked;
//! where the ledger recorded a digest, the archive copy is pulled and its
//! digest compared.

use crate::adapters::dicom::GatewayTransport;
use crate::adapters::dicom::transport::DimseTransport;
use crate::adapters::sources::resolve_archive_target;
use crate::config::load_config;
use crate::core::ledger::RunLedger;
use crate::core::verification::{VerificationReport, Verifier};
use clap::Args;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Named backup environment whose archive to verify against
    #[arg(short, long)]
    pub environment: String,

    /// Cap on ledger entries checked this sweep
    #[arg(long)]
    pub max_records: Option<usize>,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(environment = %self.environment, "Starting verification sweep");

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let environment = match config.environment(&self.environment) {
            Some(env) => env.clone(),
            None => {
                let available = config
                    .environments
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                eprintln!(
                    "Environment '{}' is not defined in {config_path}",
                    self.environment
                );
                eprintln!("Available environments: {available}");
                return Ok(2); // Configuration error exit code
            }
        };

        let archive = match resolve_archive_target(&config, &environment.archive) {
            Ok(target) => target,
            Err(e) => {
                eprintln!("Failed to resolve archive peer: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let transport: Arc<dyn DimseTransport> =
            match GatewayTransport::new(config.gateway.clone()) {
                Ok(t) => Arc::new(t),
                Err(e) => {
                    eprintln!("Failed to initialize gateway client: {e}");
                    return Ok(4); // Connection error exit code
                }
            };
        let verifier = Verifier::new(transport);

        let ledger = match RunLedger::load(&config.ledger.path).await {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to load run ledger: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let mut succeeded: Vec<_> = ledger
            .entries()
            .await
            .into_iter()
            .filter(|entry| entry.is_succeeded())
            .collect();
        if let Some(max) = self.max_records {
            succeeded.truncate(max);
        }

        if succeeded.is_empty() {
            println!("No succeeded ledger entries to verify.");
            println!("Run 'aegis backup' first.");
            return Ok(0);
        }

        println!("🔍 Verifying {} record(s) against {archive}", succeeded.len());
        println!();

        let start = Instant::now();
        let mut report = VerificationReport::new();
        let mut interrupted = false;

        for entry in &succeeded {
            if *shutdown_signal.borrow() {
                tracing::info!("Shutdown requested; stopping verification sweep");
                interrupted = true;
                for _ in report.total_checked..succeeded.len() {
                    report.record_skip();
                }
                break;
            }

            let outcome = verifier
                .verify_against_digest(&entry.object_id, &archive, entry.digest.as_deref())
                .await;
            report.record(&entry.object_id, &outcome);
        }
        report.set_duration(start.elapsed().as_millis() as u64);

        println!("{}", report.format_summary());

        let exit_code = if interrupted {
            println!("⚠️  Verification interrupted. Re-run to sweep the full ledger.");
            130 // SIGINT exit code (standard Unix convention)
        } else if report.is_clean() {
            println!("✅ Archive verified clean.");
            0
        } else {
            println!("⚠️  Verification found problems. See failures above.");
            1 // Partial success
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_args_defaults() {
        let args = VerifyArgs {
            environment: "MAIN_CAMPUS".to_string(),
            max_records: None,
        };

        assert_eq!(args.environment, "MAIN_CAMPUS");
        assert!(args.max_records.is_none());
    }

    #[test]
    fn test_verify_args_with_cap() {
        let args = VerifyArgs {
            environment: "SATELLITE".to_string(),
            max_records: Some(100),
        };

        assert_eq!(args.max_records, Some(100));
    }
}
