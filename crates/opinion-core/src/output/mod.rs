//! Output
//!
//! JSONL event logging and statistics files.

pub mod logger;
pub mod stats;

pub use logger::EventLogger;
pub use stats::{write_statistics, RunSummary};
