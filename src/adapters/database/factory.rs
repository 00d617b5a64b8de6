//! Database client factory
//!
//! This module provides factory functions to create delivery database
//! clients from configuration.

use crate::adapters::database::postgres::PostgresClient;
use crate::adapters::database::traits::DatabaseClient;
use crate::config::schema::{AegisConfig, DatabaseConfig};
use crate::domain::{AegisError, Result};
use std::sync::Arc;

/// Create a delivery database client from one database configuration
///
/// # Arguments
///
/// * `config` - The database connection configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements DatabaseClient
///
/// # Errors
///
/// Returns an error if the database client cannot be created
pub async fn create_database_client(
    config: &DatabaseConfig,
) -> Result<Arc<dyn DatabaseClient + Send + Sync>> {
    tracing::info!("Creating PostgreSQL delivery database client");
    let client = PostgresClient::new(config.clone()).await?;
    Ok(Arc::new(client) as Arc<dyn DatabaseClient + Send + Sync>)
}

/// Create a delivery database client for a named `[databases]` entry
///
/// # Arguments
///
/// * `config` - The full pipeline configuration
/// * `name` - Database alias to look up
///
/// # Errors
///
/// Returns an error when the alias is not configured or the client cannot
/// be created
pub async fn create_named_database_client(
    config: &AegisConfig,
    name: &str,
) -> Result<Arc<dyn DatabaseClient + Send + Sync>> {
    let db_config = config.database(name).ok_or_else(|| {
        AegisError::Configuration(format!("Database '{}' is not configured", name))
    })?;
    create_database_client(db_config).await
}
