//! Statistics Output
//!
//! Writes statistics snapshots for analysis and summarizes finished runs.

use opinion_events::{Opinion, OpinionCounts, Statistics, TerminationReason, ZealotCounts};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::SimError;

/// Compact summary of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub interactions: u64,
    pub counts: OpinionCounts,
    pub zealots: ZealotCounts,
    pub termination: Option<TerminationReason>,
    pub winner: Option<Opinion>,
    pub history_len: usize,
    /// Largest red share seen in the retained history
    pub peak_red_proportion: f64,
    /// Largest blue share seen in the retained history
    pub peak_blue_proportion: f64,
}

impl RunSummary {
    pub fn from_statistics(stats: &Statistics) -> Self {
        let peak = |f: fn(&opinion_events::OpinionSnapshot) -> f64| {
            stats.history.iter().map(f).fold(0.0f64, f64::max)
        };
        Self {
            run_id: stats.run_id,
            interactions: stats.interaction_count,
            counts: stats.counts,
            zealots: stats.zealots,
            termination: stats.termination,
            winner: stats.termination.and_then(|t| t.winner()),
            history_len: stats.history.len(),
            peak_red_proportion: peak(|s| s.red_proportion),
            peak_blue_proportion: peak(|s| s.blue_proportion),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {}", self.run_id)?;
        writeln!(f, "  Interactions: {}", self.interactions)?;
        writeln!(
            f,
            "  Final counts: red {} / blue {}",
            self.counts.red, self.counts.blue
        )?;
        writeln!(
            f,
            "  Zealots: red {} / blue {}",
            self.zealots.red, self.zealots.blue
        )?;
        writeln!(
            f,
            "  Peak share: red {:.1}% / blue {:.1}%",
            self.peak_red_proportion * 100.0,
            self.peak_blue_proportion * 100.0
        )?;
        let outcome = match (self.termination, self.winner) {
            (_, Some(winner)) => format!("{} dominance", winner),
            (Some(TerminationReason::InteractionCap), None) => "interaction cap reached".to_string(),
            (Some(TerminationReason::NoPairAvailable), None) => "no usable pair left".to_string(),
            _ => "still running".to_string(),
        };
        write!(f, "  Outcome: {}", outcome)
    }
}

/// Write statistics to a JSON file, creating parent directories
pub fn write_statistics(path: impl AsRef<Path>, stats: &Statistics) -> Result<(), SimError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)?;
    Ok(())
}
