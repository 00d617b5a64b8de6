//! Backup command implementation
//!
//! This module implements the `backup` command: run the full pipeline for
//! one named environment, from enumeration through transfer to the
//! post-transfer verification pass.

use crate::adapters::dicom::GatewayTransport;
use crate::adapters::dicom::transport::DimseTransport;
use crate::adapters::sources::create_source_adapter;
use crate::config::{load_config, AegisConfig};
use crate::core::ledger::RunLedger;
use crate::core::orchestrator::Orchestrator;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the backup command
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Named backup environment to run
    #[arg(short, long)]
    pub environment: String,

    /// Override the environment's source alias
    #[arg(long)]
    pub source: Option<String>,

    /// Cap on records processed this run (oldest first)
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Dry run mode - enumerate and plan without transferring
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the post-transfer verification pass
    #[arg(long)]
    pub skip_verification: bool,
}

impl BackupArgs {
    /// Execute the backup command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(environment = %self.environment, "Starting backup command");

        // Load configuration
        let mut config = load_config(config_path)?;

        // Apply CLI overrides
        if self.max_records.is_some() {
            tracing::info!(max_records = ?self.max_records, "Overriding record cap from CLI");
        }
        if let Some(environment) = config.environments.get_mut(&self.environment) {
            if self.max_records.is_some() {
                environment.max_per_run = self.max_records;
            }
        }

        if let Some(source) = &self.source {
            tracing::info!(source = %source, "Overriding source alias from CLI");
        }

        if self.skip_verification {
            tracing::info!("Disabling verification pass from CLI");
            config.verification.enable_verification = false;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        // Resolve the environment up front so a typo reads as a
        // configuration problem, not a connection one
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
        let source_alias = self
            .source
            .clone()
            .unwrap_or_else(|| environment.source.clone());

        // Dry run mode: enumerate and plan, transfer nothing
        if self.dry_run {
            tracing::info!("Dry run mode enabled - no records will be transferred");
            println!("🔍 DRY RUN MODE - No records will be transferred");
            println!();
            return self.plan_only(&config, &source_alias).await;
        }

        // Confirmation prompt (unless --yes)
        if !self.yes {
            println!("Backup Configuration:");
            println!("  Environment: {}", self.environment);
            println!("  Source: {source_alias}");
            println!("  Archive: {}", environment.archive);
            println!(
                "  Max records: {}",
                match environment.max_per_run {
                    Some(max) => max.to_string(),
                    None => "unlimited".to_string(),
                }
            );
            println!(
                "  Verification: {}",
                if config.verification.enable_verification {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!();
            print!("Proceed with backup? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Backup cancelled.");
                return Ok(0);
            }
        }

        // Create orchestrator
        tracing::info!("Creating backup orchestrator");
        let orchestrator = match Orchestrator::from_config(
            &config,
            &self.environment,
            self.source.as_deref(),
            shutdown_signal,
        )
        .await
        {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create backup orchestrator");
                eprintln!("Failed to initialize backup: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        // Execute the run
        tracing::info!("Executing backup run");
        println!("🚀 Starting backup...");
        println!();

        let summary = orchestrator.run().await;

        // Display summary
        println!();
        println!("📊 Backup Summary:");
        println!("  Run ID: {}", summary.run_id);
        println!("  Records Enumerated: {}", summary.enumerated);
        println!("  Already Backed Up: {}", summary.skipped_prior_success);
        println!("  Deferred: {}", summary.deferred);
        println!("  Succeeded: {}", summary.succeeded);
        println!("  Failed: {}", summary.failed);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        // Display verification results if available
        if let Some(report) = &summary.verification {
            println!("🔍 Verification Results:");
            println!("  Total Checked: {}", report.total_checked);
            println!("  Matched: {}", report.matched);
            println!("  Mismatched: {}", report.mismatched);
            println!("  Missing: {}", report.missing);
            println!("  Errored: {}", report.errored);
            println!("  Skipped: {}", report.skipped);
            println!("  Verification Rate: {:.2}%", report.success_rate());
            println!("  Duration: {:.2}s", report.duration_ms as f64 / 1000.0);

            if !report.failures.is_empty() {
                println!();
                println!("  ⚠️  Verification Failures:");
                for (i, failure) in report.failures.iter().enumerate() {
                    if i < 10 {
                        // Show first 10 failures
                        println!("    - {} ({})", failure.object_id, failure.kind);
                        println!("      Reason: {}", failure.detail);
                    }
                }
                if report.failures.len() > 10 {
                    println!("    ... and {} more failures", report.failures.len() - 10);
                }
            }
            println!();
        }

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in &summary.errors {
                println!("  - {:?}: {}", error.kind, error.message);
                if let Some(context) = &error.context {
                    println!("    Context: {context}");
                }
            }
            println!();
        }

        // Determine exit code
        let exit_code = if summary.interrupted {
            println!();
            println!("⚠️  Backup interrupted gracefully. Progress saved.");
            println!("   Run the same command to resume from the ledger.");
            println!();
            tracing::info!("Backup interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_success() {
            println!("✅ Backup completed successfully!");
            0
        } else if summary.processed() == 0 && !summary.errors.is_empty() {
            println!("❌ Backup failed before any records were processed");
            5 // Fatal error exit code
        } else {
            println!("⚠️  Backup completed with failures");
            1 // Partial success
        };

        Ok(exit_code)
    }

    /// Dry run: enumerate candidates, apply the ledger filter and record
    /// cap, and print what a real run would transfer.
    async fn plan_only(&self, config: &AegisConfig, source_alias: &str) -> anyhow::Result<i32> {
        let transport: Arc<dyn DimseTransport> =
            match GatewayTransport::new(config.gateway.clone()) {
                Ok(t) => Arc::new(t),
                Err(e) => {
                    eprintln!("Failed to initialize gateway client: {e}");
                    return Ok(4); // Connection error exit code
                }
            };

        let source = match create_source_adapter(config, source_alias, transport).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to initialize source '{source_alias}': {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let ledger = match RunLedger::load(&config.ledger.path).await {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Failed to load run ledger: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let candidates = match source.find(&source.default_criteria()).await {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Enumeration failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let already_succeeded = ledger.succeeded_ids().await;
        let pending: Vec<_> = candidates
            .iter()
            .filter(|c| !already_succeeded.contains(&c.object_id))
            .collect();

        let max_per_run = config
            .environment(&self.environment)
            .and_then(|env| env.max_per_run);
        let planned = match max_per_run {
            Some(max) => &pending[..pending.len().min(max)],
            None => &pending[..],
        };

        println!("📋 Backup Plan:");
        println!("  Source: {source_alias}");
        println!("  Candidates: {}", candidates.len());
        println!("  Already Backed Up: {}", candidates.len() - pending.len());
        println!("  Would Transfer: {}", planned.len());
        if planned.len() < pending.len() {
            println!(
                "  Deferred by Record Cap: {}",
                pending.len() - planned.len()
            );
        }

        if !planned.is_empty() {
            println!();
            for (i, record) in planned.iter().enumerate() {
                if i < 10 {
                    println!("    - {}", record.object_id);
                }
            }
            if planned.len() > 10 {
                println!("    ... and {} more records", planned.len() - 10);
            }
        }

        println!();
        println!("✅ Dry run complete. No records were transferred.");
        Ok(0)
    }
}
