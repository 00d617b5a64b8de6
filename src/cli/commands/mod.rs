//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod backup;
pub mod init;
pub mod probe;
pub mod status;
pub mod validate;
pub mod verify;
