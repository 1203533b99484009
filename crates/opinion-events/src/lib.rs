//! Shared data types for the opinion dynamics simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and drivers depend on it to consume interaction results,
//! progress reports and statistics without linking the engine.

pub mod interaction;
pub mod opinion;
pub mod snapshot;

// Re-export opinion types
pub use opinion::{Opinion, OpinionCounts, ZealotCounts};

// Re-export interaction types
pub use interaction::{InteractionResult, Pairing, PairingKind, ParticipantChange};

// Re-export snapshot types
pub use snapshot::{
    CompletionReport, OpinionSnapshot, ProgressReport, Statistics, TerminationReason,
};
