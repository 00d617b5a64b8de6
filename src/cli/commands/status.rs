//! Status command implementation
//!
//! This module implements the `status` command for displaying run ledger
//! contents: per-outcome counts and the terminal entries themselves.

use crate::config::load_config;
use crate::core::ledger::RunLedger;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Filter by outcome (succeeded or failed)
    #[arg(long)]
    pub outcome: Option<String>,

    /// Filter by failure reason code
    #[arg(long)]
    pub reason: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking ledger status");

        println!("📊 Ledger Status");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        // Load the run ledger
        let ledger = match RunLedger::load(&config.ledger.path).await {
            Ok(l) => l,
            Err(e) => {
                println!("❌ Failed to load run ledger");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };

        let entries = ledger.entries().await;

        if entries.is_empty() {
            println!("No backup history found in {}.", config.ledger.path);
            println!("Run 'aegis backup' to start backing up records.");
            return Ok(0);
        }

        let succeeded = entries.iter().filter(|e| e.is_succeeded()).count();
        let failed = entries.len() - succeeded;
        let last_recorded = entries.iter().map(|e| e.recorded_at).max();

        println!("Ledger: {}", config.ledger.path);
        println!("  Total entries: {}", entries.len());
        println!("  ✅ Succeeded: {succeeded}");
        println!("  ❌ Failed: {failed}");
        if let Some(at) = last_recorded {
            println!("  Last recorded: {}", at.format("%Y-%m-%d %H:%M:%S"));
        }
        println!();

        // Filter entries if requested
        let filtered: Vec<_> = entries
            .iter()
            .filter(|entry| {
                if let Some(ref outcome) = self.outcome {
                    let label = if entry.is_succeeded() {
                        "succeeded"
                    } else {
                        "failed"
                    };
                    if !label.eq_ignore_ascii_case(outcome) {
                        return false;
                    }
                }
                if let Some(ref reason) = self.reason {
                    if entry.reason.as_deref() != Some(reason.as_str()) {
                        return false;
                    }
                }
                true
            })
            .collect();

        if filtered.is_empty() {
            println!("No ledger entries match the specified filters.");
            return Ok(0);
        }

        // Display entries in table format
        println!("Found {} entry(ies):", filtered.len());
        println!();
        println!(
            "{:<44} {:<14} {:<9} {:<10} {:<25}",
            "Object ID", "Outcome", "Attempts", "Reason", "Recorded"
        );
        println!("{}", "-".repeat(105));

        for entry in filtered {
            let outcome = if entry.is_succeeded() {
                "✅ Succeeded"
            } else {
                "❌ Failed"
            };

            println!(
                "{:<44} {:<14} {:<9} {:<10} {:<25}",
                entry.object_id.as_str(),
                outcome,
                entry.attempts,
                entry.reason.as_deref().unwrap_or("-"),
                entry.recorded_at.format("%Y-%m-%d %H:%M:%S")
            );
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_args_defaults() {
        let args = StatusArgs {
            outcome: None,
            reason: None,
        };

        assert!(args.outcome.is_none());
        assert!(args.reason.is_none());
    }

    #[test]
    fn test_status_args_with_filters() {
        let args = StatusArgs {
            outcome: Some("failed".to_string()),
            reason: Some("store".to_string()),
        };

        assert_eq!(args.outcome, Some("failed".to_string()));
        assert_eq!(args.reason, Some("store".to_string()));
    }
}
