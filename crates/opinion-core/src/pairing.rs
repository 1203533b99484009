//! Pair Selection
//!
//! Chooses the two agents that interact in a step. Most of the time the
//! pair are network neighbors; otherwise a breadth-first search from a
//! random agent finds someone several hops away, so beliefs can travel
//! along paths neither participant is directly part of.

use opinion_events::Pairing;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

use crate::agent::{Agent, AgentId};
use crate::config::SimulationConfig;

/// Breadth-first search tree rooted at one agent.
#[derive(Debug, Clone)]
pub struct SearchTree {
    parent: Vec<Option<AgentId>>,
    distance: Vec<Option<usize>>,
}

impl SearchTree {
    /// Runs a breadth-first search from `start`. Neighbors are visited in
    /// stored order, which fixes the shortest path chosen among ties.
    pub fn search(agents: &[Agent], start: AgentId) -> Self {
        let mut parent = vec![None; agents.len()];
        let mut distance = vec![None; agents.len()];
        let mut queue = VecDeque::new();

        distance[start] = Some(0);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let next_distance = distance[current].map_or(0, |d| d + 1);
            for &neighbor in agents[current].neighbors() {
                if distance[neighbor].is_none() {
                    distance[neighbor] = Some(next_distance);
                    parent[neighbor] = Some(current);
                    queue.push_back(neighbor);
                }
            }
        }

        Self { parent, distance }
    }

    /// Hops from the start, `None` if unreachable.
    pub fn distance(&self, target: AgentId) -> Option<usize> {
        self.distance.get(target).copied().flatten()
    }

    /// Agents reachable from the start, excluding the start itself.
    pub fn reachable(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.distance
            .iter()
            .enumerate()
            .filter(|(_, d)| matches!(d, Some(hops) if *hops > 0))
            .map(|(id, _)| id)
    }

    /// Shortest path from the start to `target`, both ends included.
    pub fn path_to(&self, target: AgentId) -> Option<Vec<AgentId>> {
        self.distance(target)?;
        let mut path = vec![target];
        let mut current = target;
        while let Some(previous) = self.parent[current] {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}

/// Direct-or-indirect pair selection policy.
#[derive(Debug, Clone)]
pub struct PairFinder {
    direct_probability: f64,
    direct_attempts: usize,
    indirect_attempts: usize,
}

impl Default for PairFinder {
    fn default() -> Self {
        Self {
            direct_probability: 0.7,
            direct_attempts: 5,
            indirect_attempts: 3,
        }
    }
}

impl PairFinder {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            direct_probability: config.tuning.direct_pair_probability.clamp(0.0, 1.0),
            direct_attempts: config.tuning.direct_pair_attempts,
            indirect_attempts: config.tuning.indirect_pair_attempts,
        }
    }

    pub fn with_direct_probability(mut self, probability: f64) -> Self {
        self.direct_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Selects two distinct agents to interact.
    ///
    /// Returns `None` when the graph offers no usable pair.
    pub fn find<R: Rng + ?Sized>(&self, agents: &[Agent], rng: &mut R) -> Option<Pairing> {
        if agents.len() < 2 {
            return None;
        }

        if rng.gen_bool(self.direct_probability) {
            if let Some(pairing) = self.find_direct(agents, rng) {
                return Some(pairing);
            }
        }

        if let Some(pairing) = self.find_indirect(agents, rng) {
            return Some(pairing);
        }

        self.find_direct(agents, rng)
    }

    /// Picks a random agent with at least one neighbor, then one of its
    /// neighbors.
    pub fn find_direct<R: Rng + ?Sized>(&self, agents: &[Agent], rng: &mut R) -> Option<Pairing> {
        let connected: Vec<&Agent> = agents.iter().filter(|a| a.degree() > 0).collect();
        if connected.is_empty() {
            return None;
        }
        for _ in 0..self.direct_attempts {
            let Some(agent) = connected.choose(rng) else {
                break;
            };
            if let Some(&neighbor) = agent.neighbors().choose(rng) {
                return Some(Pairing::direct(agent.id(), neighbor));
            }
        }
        None
    }

    /// Searches from a random agent and prefers partners more than one hop
    /// away, falling back to any reachable agent.
    pub fn find_indirect<R: Rng + ?Sized>(&self, agents: &[Agent], rng: &mut R) -> Option<Pairing> {
        if agents.is_empty() {
            return None;
        }
        for _ in 0..self.indirect_attempts {
            let start = rng.gen_range(0..agents.len());
            let tree = SearchTree::search(agents, start);

            let reachable: Vec<AgentId> = tree.reachable().collect();
            let multi_hop: Vec<AgentId> = reachable
                .iter()
                .copied()
                .filter(|&id| tree.distance(id).map_or(false, |hops| hops > 1))
                .collect();

            let target = if multi_hop.is_empty() {
                reachable.choose(rng).copied()
            } else {
                multi_hop.choose(rng).copied()
            };

            if let Some(pairing) = target
                .and_then(|id| tree.path_to(id))
                .and_then(Pairing::along_path)
            {
                return Some(pairing);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::link;
    use opinion_events::PairingKind;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn chain(len: usize) -> Vec<Agent> {
        let mut agents: Vec<Agent> = (0..len).map(|id| Agent::new(id, 0.1)).collect();
        for id in 1..len {
            link(&mut agents, id - 1, id);
        }
        agents
    }

    #[test]
    fn test_search_tree_on_chain() {
        let agents = chain(5);
        let tree = SearchTree::search(&agents, 0);

        assert_eq!(tree.distance(0), Some(0));
        assert_eq!(tree.distance(4), Some(4));
        assert_eq!(tree.path_to(3), Some(vec![0, 1, 2, 3]));
        assert_eq!(tree.reachable().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_tree_unreachable() {
        let mut agents = chain(3);
        agents.push(Agent::new(3, 0.2));
        let tree = SearchTree::search(&agents, 0);

        assert_eq!(tree.distance(3), None);
        assert_eq!(tree.path_to(3), None);
        assert!(!tree.reachable().any(|id| id == 3));
    }

    #[test]
    fn test_search_finds_shortest_path() {
        // 0-1-2-3 plus shortcut 0-3
        let mut agents = chain(4);
        link(&mut agents, 0, 3);
        let tree = SearchTree::search(&agents, 0);

        assert_eq!(tree.path_to(3), Some(vec![0, 3]));
        assert_eq!(tree.path_to(2).map(|p| p.len()), Some(3));
    }

    #[test]
    fn test_direct_pairs_are_neighbors() {
        let mut rng = SmallRng::seed_from_u64(42);
        let agents = chain(6);
        let finder = PairFinder::default().with_direct_probability(1.0);

        for _ in 0..100 {
            let pairing = finder.find(&agents, &mut rng).unwrap();
            assert_ne!(pairing.first, pairing.second);
            assert_eq!(pairing.kind, PairingKind::Direct);
            assert!(agents[pairing.first].has_neighbor(pairing.second));
        }
    }

    #[test]
    fn test_indirect_pairs_prefer_multi_hop() {
        let mut rng = SmallRng::seed_from_u64(8);
        let agents = chain(6);
        let finder = PairFinder::default();

        for _ in 0..100 {
            let pairing = finder.find_indirect(&agents, &mut rng).unwrap();
            // Every start on a chain of six has someone two or more hops away
            assert!(pairing.path.len() > 2);
            assert_eq!(pairing.kind, PairingKind::Indirect);
            assert_eq!(pairing.path[0], pairing.first);
            assert_eq!(*pairing.path.last().unwrap(), pairing.second);
            for hop in pairing.path.windows(2) {
                assert!(agents[hop[0]].has_neighbor(hop[1]));
            }
        }
    }

    #[test]
    fn test_indirect_falls_back_to_neighbor() {
        // Two connected agents: no multi-hop partner exists
        let mut rng = SmallRng::seed_from_u64(3);
        let agents = chain(2);
        let pairing = PairFinder::default()
            .find_indirect(&agents, &mut rng)
            .unwrap();

        assert_eq!(pairing.path.len(), 2);
        assert_eq!(pairing.kind, PairingKind::Direct);
    }

    #[test]
    fn test_no_edges_means_no_pair() {
        let mut rng = SmallRng::seed_from_u64(1);
        let agents: Vec<Agent> = (0..5).map(|id| Agent::new(id, -0.3)).collect();

        assert!(PairFinder::default().find(&agents, &mut rng).is_none());
    }

    #[test]
    fn test_direct_pick_skips_isolated_agents() {
        // One linked pair among fifty agents
        let mut agents: Vec<Agent> = (0..50).map(|id| Agent::new(id, 0.4)).collect();
        link(&mut agents, 0, 1);
        let finder = PairFinder::default().with_direct_probability(1.0);

        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let pairing = finder.find(&agents, &mut rng).unwrap();
            assert!(pairing.involves(0) && pairing.involves(1));
            assert_eq!(pairing.kind, PairingKind::Direct);
        }
    }

    #[test]
    fn test_too_small_population_means_no_pair() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(PairFinder::default().find(&[], &mut rng).is_none());
        assert!(PairFinder::default()
            .find(&[Agent::new(0, 0.5)], &mut rng)
            .is_none());
    }

    #[test]
    fn test_mixed_policy_produces_both_kinds() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let agents = chain(10);
        let finder = PairFinder::default();

        let pairings: Vec<Pairing> = (0..200)
            .filter_map(|_| finder.find(&agents, &mut rng))
            .collect();

        assert_eq!(pairings.len(), 200);
        assert!(pairings.iter().any(|p| p.kind == PairingKind::Direct));
        assert!(pairings.iter().any(|p| p.kind == PairingKind::Indirect));
    }
}
