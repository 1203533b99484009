//! Interaction Types
//!
//! The pair selected for one interaction and the before/after record the
//! engine emits for every step.

use serde::{Deserialize, Serialize};

use crate::opinion::{Opinion, OpinionCounts};

/// How the two participants of a pairing are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingKind {
    /// Network neighbors
    Direct,
    /// Reached through a breadth-first search from the first participant
    Indirect,
}

/// Two agents selected to interact, plus the path connecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub first: usize,
    pub second: usize,
    /// Agent ids from `first` to `second` inclusive. Length 2 means direct neighbors.
    pub path: Vec<usize>,
    pub kind: PairingKind,
}

impl Pairing {
    /// Creates a pairing between two neighbors.
    pub fn direct(first: usize, second: usize) -> Self {
        Self {
            first,
            second,
            path: vec![first, second],
            kind: PairingKind::Direct,
        }
    }

    /// Creates a pairing along a search path. The endpoints come from the
    /// path, and a two-entry path is a direct pairing.
    ///
    /// Returns `None` if the path has fewer than two entries.
    pub fn along_path(path: Vec<usize>) -> Option<Self> {
        if path.len() < 2 {
            return None;
        }
        let first = path[0];
        let second = path[path.len() - 1];
        let kind = if path.len() == 2 {
            PairingKind::Direct
        } else {
            PairingKind::Indirect
        };
        Some(Self {
            first,
            second,
            path,
            kind,
        })
    }

    /// Number of edges between the participants.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn involves(&self, agent_id: usize) -> bool {
        self.first == agent_id || self.second == agent_id
    }
}

/// One participant's state around an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantChange {
    pub agent_id: usize,
    pub is_zealot: bool,
    pub belief_before: f64,
    pub belief_after: f64,
    pub opinion_before: Opinion,
    pub opinion_after: Opinion,
}

impl ParticipantChange {
    pub fn opinion_changed(&self) -> bool {
        self.opinion_before != self.opinion_after
    }

    pub fn belief_delta(&self) -> f64 {
        self.belief_after - self.belief_before
    }
}

/// Everything that happened in one step of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    /// Interaction count after this step (1-based)
    pub interaction: u64,
    pub first: ParticipantChange,
    pub second: ParticipantChange,
    pub counts: OpinionCounts,
    pub pairing: Pairing,
    pub is_complete: bool,
}
