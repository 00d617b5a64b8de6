//! Delivery database abstraction layer
//!
//! This module provides a trait-based abstraction for the treatment-delivery
//! databases the pipeline enumerates from, with a PostgreSQL implementation
//! and a registry of named, read-only query templates.

pub mod factory;
pub mod postgres;
pub mod templates;
pub mod traits;

pub use factory::{create_database_client, create_named_database_client};
pub use postgres::PostgresClient;
pub use traits::{DatabaseClient, TemplateParam};
