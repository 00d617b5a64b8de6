//! Probe command implementation
//!
//! This module implements the `probe` command: connectivity checks for the
//! gateway service, every configured peer, and every configured database,
//! without transferring anything.

use crate::adapters::database::create_database_client;
use crate::adapters::dicom::GatewayTransport;
use crate::adapters::dicom::transport::DimseTransport;
use crate::config::load_config;
use crate::domain::ids::PeerId;
use clap::Args;

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Probe only this peer alias
    #[arg(long)]
    pub peer: Option<String>,

    /// Skip database connection checks
    #[arg(long)]
    pub skip_databases: bool,
}

impl ProbeArgs {
    /// Execute the probe command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Probing connectivity");

        println!("🔌 Probing connectivity");
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

        let transport = match GatewayTransport::new(config.gateway.clone()) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ Failed to initialize gateway client");
                println!("   Error: {}", e);
                return Ok(4); // Connection error exit code
            }
        };

        let mut failures = 0usize;

        // Gateway health endpoint
        match transport.health().await {
            Ok(health) => {
                let version = health.version.as_deref().unwrap_or("unknown");
                println!(
                    "✅ Gateway {} - status '{}', version {}",
                    config.gateway.base_url, health.status, version
                );
            }
            Err(e) => {
                println!("❌ Gateway {} - {}", config.gateway.base_url, e);
                failures += 1;
            }
        }

        // Echo each configured peer through the gateway
        for (alias, peer_config) in &config.peers {
            if let Some(ref only) = self.peer {
                if alias != only {
                    continue;
                }
            }

            let peer = match PeerId::new(peer_config.aet.clone()) {
                Ok(p) => p,
                Err(e) => {
                    println!("❌ Peer {alias} ({}) - invalid identity: {e}", peer_config.aet);
                    failures += 1;
                    continue;
                }
            };

            match transport.echo(&peer).await {
                Ok(()) => {
                    println!(
                        "✅ Peer {alias} ({} at {}:{}) - echo accepted",
                        peer_config.aet, peer_config.host, peer_config.port
                    );
                }
                Err(e) => {
                    println!(
                        "❌ Peer {alias} ({} at {}:{}) - {e}",
                        peer_config.aet, peer_config.host, peer_config.port
                    );
                    failures += 1;
                }
            }
        }

        // Test each configured database connection
        if !self.skip_databases {
            for (name, db_config) in &config.databases {
                match create_database_client(db_config).await {
                    Ok(client) => match client.test_connection().await {
                        Ok(()) => println!("✅ Database {name} - connection ok"),
                        Err(e) => {
                            println!("❌ Database {name} - {e}");
                            failures += 1;
                        }
                    },
                    Err(e) => {
                        println!("❌ Database {name} - {e}");
                        failures += 1;
                    }
                }
            }
        }

        println!();
        if failures == 0 {
            println!("✅ All probes passed");
            Ok(0)
        } else {
            println!("❌ {failures} probe(s) failed");
            Ok(4) // Connection error exit code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_args_defaults() {
        let args = ProbeArgs {
            peer: None,
            skip_databases: false,
        };

        assert!(args.peer.is_none());
        assert!(!args.skip_databases);
    }

    #[test]
    fn test_probe_args_with_filter() {
        let args = ProbeArgs {
            peer: Some("ARCHIVE".to_string()),
            skip_databases: true,
        };

        assert_eq!(args.peer, Some("ARCHIVE".to_string()));
        assert!(args.skip_databases);
    }
}
