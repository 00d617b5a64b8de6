//! Two-phase staging transfer for database-origin records
//!
//! Synthesized records cannot be pushed peer-to-peer; they are stored to a
//! staging peer first, then forwarded to the archive. The coordinator owns
//! that sequence and its failure attribution.

pub mod coordinator;

pub use coordinator::StagingCoordinator;
