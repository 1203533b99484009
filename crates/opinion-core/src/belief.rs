//! Belief Update
//!
//! How one participant's belief responds to an interaction. Each side of an
//! interaction is updated independently against a snapshot of the other
//! side taken before either update.

use rand::Rng;

use crate::agent::{Agent, Counterpart};
use crate::config::SimulationConfig;

/// Belief update rule with its two parameters.
#[derive(Debug, Clone)]
pub struct BeliefDynamics {
    influence_rate: f64,
    zealot_influence_probability: f64,
}

impl Default for BeliefDynamics {
    fn default() -> Self {
        Self {
            influence_rate: 0.1,
            zealot_influence_probability: 1.0,
        }
    }
}

impl BeliefDynamics {
    pub fn new(influence_rate: f64, zealot_influence_probability: f64) -> Self {
        Self {
            influence_rate,
            zealot_influence_probability: zealot_influence_probability.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.tuning.influence_rate,
            config.zealot_influence_probability,
        )
    }

    /// Fraction of `agent`'s neighbors whose current opinion differs from
    /// its own. Zero for an agent without neighbors.
    pub fn susceptibility(agent: &Agent, population: &[Agent]) -> f64 {
        let neighbors = agent.neighbors();
        if neighbors.is_empty() {
            return 0.0;
        }
        let own = agent.opinion();
        let opposed = neighbors
            .iter()
            .filter(|&&id| population[id].opinion() != own)
            .count();
        opposed as f64 / neighbors.len() as f64
    }

    /// Applies one interaction to `agent`.
    ///
    /// `susceptibility` must be computed from the population state before
    /// either participant was updated. Returns true if the agent's opinion
    /// changed sides.
    pub fn update<R: Rng + ?Sized>(
        &self,
        agent: &mut Agent,
        other: &Counterpart,
        susceptibility: f64,
        timestamp: u64,
        rng: &mut R,
    ) -> bool {
        agent.record_interaction(other, timestamp);

        if agent.is_zealot() {
            return false;
        }
        if agent.degree() == 0 {
            return false;
        }

        let opinion_before = agent.opinion();

        if other.is_zealot {
            if rng.gen_bool(self.zealot_influence_probability) {
                agent.set_belief(other.belief);
            }
        } else {
            let belief = agent.belief();
            let direction = direction(other.belief - belief);
            let influence = self.influence_rate * susceptibility * (1.0 - other.belief.abs());
            agent.set_belief(belief + direction * influence);
        }

        debug_assert!((-1.0..=1.0).contains(&agent.belief()));
        agent.opinion() != opinion_before
    }
}

/// Sign of a belief gap, zero when the beliefs are equal.
fn direction(gap: f64) -> f64 {
    if gap > 0.0 {
        1.0
    } else if gap < 0.0 {
        -1.0
    } else {
        0.0
    }
}
