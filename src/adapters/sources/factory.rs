//! Source adapter factory
//!
//! Resolves a configured source alias into the matching adapter variant,
//! wiring in the transport, the delivery database client, and the staging
//! target the variant needs. Backup targets are resolved here too so every
//! place that turns a peer alias into a [`BackupTarget`] shares one lookup.

use crate::adapters::database::factory::create_named_database_client;
use crate::adapters::dicom::transport::DimseTransport;
use crate::config::schema::{AegisConfig, SourceConfig};
use crate::domain::ids::PeerId;
use crate::domain::model::BackupTarget;
use crate::domain::{AegisError, Result};
use std::sync::Arc;

use super::database::DatabaseQuerySource;
use super::network::NetworkQuerySource;
use super::traits::SourceAdapter;

/// Create the source adapter for a named `[sources]` entry.
///
/// # Errors
///
/// Returns an error when the alias is unknown, its referenced peers or
/// database are not configured, or the adapter rejects its configuration.
pub async fn create_source_adapter(
    config: &AegisConfig,
    alias: &str,
    transport: Arc<dyn DimseTransport>,
) -> Result<Arc<dyn SourceAdapter>> {
    let source_config = config
        .source(alias)
        .ok_or_else(|| AegisError::Configuration(format!("Source '{}' is not configured", alias)))?;

    match source_config {
        SourceConfig::Network(network) => {
            tracing::info!(source = alias, peer = %network.peer, "Creating network source adapter");
            let (peer, _, _) = resolve_peer(config, &network.peer)?;
            let adapter = NetworkQuerySource::new(alias, peer, network, transport)?;
            Ok(Arc::new(adapter) as Arc<dyn SourceAdapter>)
        }
        SourceConfig::Database(database) => {
            tracing::info!(
                source = alias,
                database = %database.database,
                staging = %database.staging,
                "Creating database source adapter"
            );
            let client = create_named_database_client(config, &database.database).await?;
            let staging = resolve_staging_target(config, &database.staging)?;
            let adapter = DatabaseQuerySource::new(alias, database, client, staging, transport)?;
            Ok(Arc::new(adapter) as Arc<dyn SourceAdapter>)
        }
    }
}

/// Resolve a peer alias into the archive target of a run.
pub fn resolve_archive_target(config: &AegisConfig, peer_alias: &str) -> Result<BackupTarget> {
    let (peer, host, port) = resolve_peer(config, peer_alias)?;
    Ok(BackupTarget::archive(peer, host, port))
}

/// Resolve a peer alias into a staging target.
pub fn resolve_staging_target(config: &AegisConfig, peer_alias: &str) -> Result<BackupTarget> {
    let (peer, host, port) = resolve_peer(config, peer_alias)?;
    Ok(BackupTarget::staging(peer, host, port))
}

fn resolve_peer(config: &AegisConfig, peer_alias: &str) -> Result<(PeerId, String, u16)> {
    let peer_config = config
        .peer(peer_alias)
        .ok_or_else(|| AegisError::Configuration(format!("Peer '{}' is not configured", peer_alias)))?;
    let peer = PeerId::new(peer_config.aet.clone()).map_err(|e| {
        AegisError::Configuration(format!("Peer '{}' has an invalid identity: {}", peer_alias, e))
    })?;
    Ok((peer, peer_config.host.clone(), peer_config.port))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[application]
log_level = "info"

[gateway]
base_url = "https://gateway.example.org:8443"
username = "aegis_svc"
password = "gw-pass"

[peers.ARCHIVE]
aet = "ARCHIVE_SCP"
host = "10.0.4.21"
port = 104

[sources.aria]
kind = "network"
peer = "ARCHIVE"
query_level = "series"

[environments.MAIN]
source = "aria"
archive = "ARCHIVE"
"#;

    fn sample_config() -> AegisConfig {
        toml::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn resolves_archive_target_from_peer_alias() {
        let target = resolve_archive_target(&sample_config(), "ARCHIVE").unwrap();
        assert!(target.supports_verification());
        assert_eq!(target.peer().as_str(), "ARCHIVE_SCP");
        assert_eq!(target.endpoint().port, 104);
    }

    #[test]
    fn staging_target_does_not_support_verification() {
        let target = resolve_staging_target(&sample_config(), "ARCHIVE").unwrap();
        assert!(!target.supports_verification());
    }

    #[test]
    fn unknown_peer_alias_is_a_configuration_error() {
        let err = resolve_archive_target(&sample_config(), "missing").unwrap_err();
        assert!(matches!(err, AegisError::Configuration(_)));
        assert!(err.to_string().contains("missing"));
    }
}
