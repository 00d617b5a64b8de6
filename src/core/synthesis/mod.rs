//! Record synthesis for database-origin sources
//!
//! Turns treatment delivery rows into self-contained clinical records:
//! the packed leaf-position codec and the synthesizer that assembles and
//! serializes the record.

pub mod leaf;
pub mod synthesizer;

pub use leaf::{ByteOrder, LeafCodec};
pub use synthesizer::RecordSynthesizer;
