//! Network Construction
//!
//! Builds the undirected interaction graph under an opinion homophily bias.
//!
//! Each agent draws a target degree and spends a fixed budget of attempts
//! filling it. Every attempt flips a coin weighted by homophily to decide
//! whether to seek a same-opinion or opposite-opinion partner. When the
//! chosen side has no candidate left the attempt is skipped, never
//! substituted with a pick from the other side, so scarce opinions lower the
//! realized degree instead of diluting the bias. Only an agent left with no
//! neighbors at all gets a forced fallback link.

use opinion_events::Opinion;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::agent::{link, Agent, AgentId};
use crate::config::SimulationConfig;

/// Outcome of building a network.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSummary {
    /// Undirected edges in the graph
    pub edges: usize,
    /// Edges formed inside the retry loop
    pub loop_links: usize,
    /// Most edges any single agent formed in its own retry loop
    pub max_own_links: usize,
    /// Edges forced for agents that ended the loop with no neighbors
    pub fallback_links: usize,
    /// Attempts whose chosen side had no candidate
    pub skipped_attempts: usize,
    /// Agents with no neighbors after construction
    pub isolated: usize,
    pub mean_degree: f64,
}

/// Homophily-biased graph builder.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    homophily: f64,
    min_degree: usize,
    max_degree: usize,
    connection_attempts: usize,
}

impl NetworkBuilder {
    /// Creates a builder with the default degree range and attempt budget.
    pub fn new(homophily: f64) -> Self {
        Self {
            homophily: homophily.clamp(0.0, 1.0),
            min_degree: 1,
            max_degree: 3,
            connection_attempts: 50,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            homophily: config.homophily.clamp(0.0, 1.0),
            min_degree: config.tuning.min_degree,
            max_degree: config.tuning.max_degree.max(config.tuning.min_degree),
            connection_attempts: config.tuning.connection_attempts,
        }
    }

    pub fn with_degree_range(mut self, min_degree: usize, max_degree: usize) -> Self {
        self.min_degree = min_degree;
        self.max_degree = max_degree.max(min_degree);
        self
    }

    pub fn with_connection_attempts(mut self, attempts: usize) -> Self {
        self.connection_attempts = attempts;
        self
    }

    /// Connects the population in place. Agents must have ids equal to
    /// their index and no neighbors yet.
    pub fn build<R: Rng + ?Sized>(&self, agents: &mut [Agent], rng: &mut R) -> NetworkSummary {
        let mut red = Vec::new();
        let mut blue = Vec::new();
        for agent in agents.iter() {
            debug_assert_eq!(agents[agent.id()].id(), agent.id(), "ids must be dense");
            match agent.opinion() {
                Opinion::Red => red.push(agent.id()),
                Opinion::Blue => blue.push(agent.id()),
            }
        }

        let mut summary = NetworkSummary::default();

        for id in 0..agents.len() {
            let own = agents[id].opinion();
            let target = rng.gen_range(self.min_degree..=self.max_degree);

            let mut attempts = 0;
            let mut own_links = 0;
            while agents[id].degree() < target && attempts < self.connection_attempts {
                attempts += 1;
                let seek_same = rng.gen_bool(self.homophily);
                let side = if seek_same { own } else { own.opposite() };

                match pick_candidate(agents, id, side_pool(&red, &blue, side), rng) {
                    Some(partner) => {
                        link(agents, id, partner);
                        own_links += 1;
                    }
                    None => summary.skipped_attempts += 1,
                }
            }
            summary.loop_links += own_links;
            summary.max_own_links = summary.max_own_links.max(own_links);

            if agents[id].degree() == 0 {
                let preference = if self.homophily >= 0.5 {
                    [own, own.opposite()]
                } else {
                    [own.opposite(), own]
                };
                for side in preference {
                    if let Some(partner) = pick_candidate(agents, id, side_pool(&red, &blue, side), rng) {
                        link(agents, id, partner);
                        summary.fallback_links += 1;
                        break;
                    }
                }
            }
        }

        summary.edges = edge_count(agents);
        summary.isolated = agents.iter().filter(|a| a.degree() == 0).count();
        summary.mean_degree = if agents.is_empty() {
            0.0
        } else {
            (2 * summary.edges) as f64 / agents.len() as f64
        };

        debug_assert!(is_symmetric(agents), "neighbor relation must be symmetric");
        debug!(
            edges = summary.edges,
            fallback_links = summary.fallback_links,
            skipped_attempts = summary.skipped_attempts,
            "network built"
        );

        summary
    }
}

fn side_pool<'a>(red: &'a [AgentId], blue: &'a [AgentId], side: Opinion) -> &'a [AgentId] {
    match side {
        Opinion::Red => red,
        Opinion::Blue => blue,
    }
}

/// Picks a uniformly random member of `pool` that is neither `id` nor
/// already its neighbor.
fn pick_candidate<R: Rng + ?Sized>(
    agents: &[Agent],
    id: AgentId,
    pool: &[AgentId],
    rng: &mut R,
) -> Option<AgentId> {
    let agent = &agents[id];
    let candidates: Vec<AgentId> = pool
        .iter()
        .copied()
        .filter(|&candidate| candidate != id && !agent.has_neighbor(candidate))
        .collect();
    candidates.choose(rng).copied()
}

/// Number of undirected edges.
pub fn edge_count(agents: &[Agent]) -> usize {
    agents.iter().map(Agent::degree).sum::<usize>() / 2
}

/// True if every neighbor entry has its reverse and there are no self-loops.
pub fn is_symmetric(agents: &[Agent]) -> bool {
    agents.iter().all(|agent| {
        agent.neighbors().iter().all(|&other| {
            other != agent.id()
                && agents
                    .get(other)
                    .map_or(false, |neighbor| neighbor.has_neighbor(agent.id()))
        })
    })
}
