//! Agent
//!
//! An individual holding a continuous belief in [-1, 1]. Its opinion is
//! always derived from the sign of the belief and never stored.

use opinion_events::Opinion;
use serde::{Deserialize, Serialize};

/// Dense agent identity, 0..N-1 within one run.
pub type AgentId = usize;

/// A past interaction as seen by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub other_id: AgentId,
    /// The other participant's belief at the time of the interaction
    pub other_belief: f64,
    /// Own belief before the update
    pub own_belief_before: f64,
    /// Logical interaction index (1-based)
    pub timestamp: u64,
}

/// The counterpart of an interaction, captured before either side updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Counterpart {
    pub id: AgentId,
    pub belief: f64,
    pub is_zealot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    belief: f64,
    is_zealot: bool,
    neighbors: Vec<AgentId>,
    history: Vec<InteractionRecord>,
    /// Set while this agent takes part in the latest interaction
    pub is_in_pairing: bool,
    /// Index of the latest interaction this agent took part in
    pub current_pairing_id: Option<u64>,
}

impl Agent {
    /// Creates a regular agent. The belief is clamped into [-1, 1].
    pub fn new(id: AgentId, belief: f64) -> Self {
        Self {
            id,
            belief: belief.clamp(-1.0, 1.0),
            is_zealot: false,
            neighbors: Vec::new(),
            history: Vec::new(),
            is_in_pairing: false,
            current_pairing_id: None,
        }
    }

    /// Creates a zealot fixed at the extreme of `opinion`.
    pub fn zealot(id: AgentId, opinion: Opinion) -> Self {
        Self {
            is_zealot: true,
            ..Self::new(id, opinion.extreme())
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn belief(&self) -> f64 {
        self.belief
    }

    pub fn opinion(&self) -> Opinion {
        Opinion::from_belief(self.belief)
    }

    pub fn is_zealot(&self) -> bool {
        self.is_zealot
    }

    pub fn neighbors(&self) -> &[AgentId] {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn has_neighbor(&self, other: AgentId) -> bool {
        self.neighbors.contains(&other)
    }

    pub fn interaction_history(&self) -> &[InteractionRecord] {
        &self.history
    }

    /// Snapshot used as the other side of an interaction.
    pub fn as_counterpart(&self) -> Counterpart {
        Counterpart {
            id: self.id,
            belief: self.belief,
            is_zealot: self.is_zealot,
        }
    }

    /// Adds a neighbor if absent. Self-loops are ignored.
    ///
    /// Returns true if the neighbor was added.
    pub(crate) fn add_neighbor(&mut self, other: AgentId) -> bool {
        if other == self.id || self.has_neighbor(other) {
            return false;
        }
        self.neighbors.push(other);
        true
    }

    /// Writes a new belief, clamped into [-1, 1]. Zealots are never written.
    pub(crate) fn set_belief(&mut self, belief: f64) {
        debug_assert!(!self.is_zealot, "zealot belief must never be written");
        if self.is_zealot {
            return;
        }
        self.belief = belief.clamp(-1.0, 1.0);
    }

    pub(crate) fn record_interaction(&mut self, other: &Counterpart, timestamp: u64) {
        self.history.push(InteractionRecord {
            other_id: other.id,
            other_belief: other.belief,
            own_belief_before: self.belief,
            timestamp,
        });
    }

    pub(crate) fn mark_paired(&mut self, interaction: u64) {
        self.is_in_pairing = true;
        self.current_pairing_id = Some(interaction);
    }

    pub(crate) fn clear_pairing(&mut self) {
        self.is_in_pairing = false;
        self.current_pairing_id = None;
    }
}

/// Connects two agents in both directions.
///
/// Returns true if a new edge was created.
pub(crate) fn link(agents: &mut [Agent], a: AgentId, b: AgentId) -> bool {
    if a == b {
        return false;
    }
    let added = agents[a].add_neighbor(b);
    agents[b].add_neighbor(a);
    added
}
