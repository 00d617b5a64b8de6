//! Record source adapters
//!
//! This module provides the source abstraction and its two implementations:
//! network query/retrieve peers and treatment delivery databases. A factory
//! builds the right adapter from a `[sources.<alias>]` entry.

pub mod database;
pub mod factory;
pub mod network;
pub mod traits;

pub use database::DatabaseQuerySource;
pub use factory::{create_source_adapter, resolve_archive_target, resolve_staging_target};
pub use network::NetworkQuerySource;
pub use traits::{SourceAdapter, TransferReport};
