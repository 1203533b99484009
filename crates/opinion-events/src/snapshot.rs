//! Snapshot Types
//!
//! Periodic opinion snapshots, progress and completion reports, and the
//! statistics view of a running simulation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interaction::Pairing;
use crate::opinion::{Opinion, OpinionCounts, ZealotCounts};

/// Opinion balance at one point of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpinionSnapshot {
    pub interaction: u64,
    pub red_count: usize,
    pub blue_count: usize,
    pub red_proportion: f64,
    pub blue_proportion: f64,
}

impl OpinionSnapshot {
    pub fn new(interaction: u64, counts: OpinionCounts) -> Self {
        Self {
            interaction,
            red_count: counts.red,
            blue_count: counts.blue,
            red_proportion: counts.proportion(Opinion::Red),
            blue_proportion: counts.proportion(Opinion::Blue),
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    /// One opinion count reached zero
    Dominance { winner: Opinion },
    /// The configured interaction cap was reached
    InteractionCap,
    /// No usable pair could be found in the network
    NoPairAvailable,
}

impl TerminationReason {
    pub fn winner(&self) -> Option<Opinion> {
        match self {
            TerminationReason::Dominance { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// Emitted every `progress_interval` interactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub interaction: u64,
    pub max_interactions: u64,
    pub counts: OpinionCounts,
    pub red_proportion: f64,
    pub blue_proportion: f64,
}

impl ProgressReport {
    pub fn new(interaction: u64, max_interactions: u64, counts: OpinionCounts) -> Self {
        Self {
            interaction,
            max_interactions,
            counts,
            red_proportion: counts.proportion(Opinion::Red),
            blue_proportion: counts.proportion(Opinion::Blue),
        }
    }

    /// Fraction of the interaction budget used so far.
    pub fn fraction_done(&self) -> f64 {
        if self.max_interactions == 0 {
            return 1.0;
        }
        (self.interaction as f64 / self.max_interactions as f64).min(1.0)
    }
}

/// Emitted once when a run becomes complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub interaction: u64,
    pub counts: OpinionCounts,
    pub reason: TerminationReason,
}

impl CompletionReport {
    pub fn winner(&self) -> Option<Opinion> {
        self.reason.winner()
    }
}

/// Read-only view of the simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub run_id: Uuid,
    pub population_size: usize,
    pub interaction_count: u64,
    pub counts: OpinionCounts,
    pub zealots: ZealotCounts,
    /// Oldest first
    pub history: Vec<OpinionSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pairing: Option<Pairing>,
    pub is_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
}

impl Statistics {
    /// Statistics of a controller that has not been initialized.
    pub fn empty() -> Self {
        Self {
            run_id: Uuid::nil(),
            population_size: 0,
            interaction_count: 0,
            counts: OpinionCounts::default(),
            zealots: ZealotCounts::default(),
            history: Vec::new(),
            current_pairing: None,
            is_complete: false,
            termination: None,
        }
    }

    pub fn red_proportion(&self) -> f64 {
        self.counts.proportion(Opinion::Red)
    }

    pub fn blue_proportion(&self) -> f64 {
        self.counts.proportion(Opinion::Blue)
    }

    pub fn latest_snapshot(&self) -> Option<&OpinionSnapshot> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_proportions() {
        let snap = OpinionSnapshot::new(20, OpinionCounts { red: 1, blue: 3 });
        assert_eq!(snap.interaction, 20);
        assert_eq!(snap.red_count, 1);
        assert!((snap.red_proportion - 0.25).abs() < 1e-12);
        assert!((snap.blue_proportion - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_termination_reason_serialization() {
        let reason = TerminationReason::Dominance { winner: Opinion::Blue };
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#"{"reason":"dominance","winner":"blue"}"#);

        let cap: TerminationReason = serde_json::from_str(r#"{"reason":"interaction_cap"}"#).unwrap();
        assert_eq!(cap, TerminationReason::InteractionCap);
        assert_eq!(cap.winner(), None);
    }

    #[test]
    fn test_progress_fraction() {
        let report = ProgressReport::new(50, 200, OpinionCounts { red: 5, blue: 5 });
        assert!((report.fraction_done() - 0.25).abs() < 1e-12);
        assert!((report.red_proportion - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = Statistics::empty();
        assert!(stats.run_id.is_nil());
        assert!(stats.history.is_empty());
        assert!(stats.latest_snapshot().is_none());
        assert!(!stats.is_complete);
        assert_eq!(stats.red_proportion(), 0.0);
    }
}
