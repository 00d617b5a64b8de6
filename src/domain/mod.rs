//! Domain models and types for Aegis.
//!
//! This module contains the core domain models, types, and business rules
//! for the backup pipeline: type-safe identifiers, the unit-of-work types
//! the orchestrator consumes, the synthesized record model, and the error
//! hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PeerId`], [`ObjectId`], [`RunId`])
//! - **Unit-of-work types** ([`CandidateRecord`], [`TransferAttempt`], [`TransferOutcome`])
//! - **Record model** ([`DeliveryRow`], [`SynthesizedClinicalRecord`])
//! - **Error types** ([`AegisError`], [`TransportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Aegis uses the newtype pattern for identifiers to prevent mixing
//! different ID types:
//!
//! ```rust
//! use aegis::domain::{PeerId, ObjectId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let peer = PeerId::new("ARCHIVE_SCP")?;
//! let object_id = ObjectId::new("1.2.826.0.1.3680043.10.1.42.77")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: PeerId = object_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AegisError>`]:
//!
//! ```rust
//! use aegis::domain::{AegisError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = aegis::config::AegisConfig::from_file("aegis.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod model;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AegisError, TransportError};
pub use ids::{ObjectId, PeerId, RunId};
pub use model::{
    BackupTarget, CandidateOrigin, CandidateRecord, FailureReason, QueryCriteria, QueryLevel,
    TargetEndpoint, TransferAttempt, TransferOutcome, UidSet,
};
pub use record::{
    BeamDelivery, ControlPointRecord, DeliveryMetadata, DeliveryRow, LeafPair,
    PatientIdentification, StudyContext, SynthesizedClinicalRecord, PLAN_CLASS_UID,
    TREATMENT_RECORD_CLASS_UID,
};
pub use result::Result;
