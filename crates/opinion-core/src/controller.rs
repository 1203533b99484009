//! Simulation Controller
//!
//! Owns the population, the graph and every counter of one run. The driver
//! calls [`SimulationController::step`] repeatedly; each call performs one
//! interaction and reports it to the registered observers.
//!
//! # Example
//!
//! ```
//! use opinion_core::{SimulationConfig, SimulationController};
//!
//! let mut sim = SimulationController::new(42);
//! sim.initialize(SimulationConfig {
//!     population_size: 30,
//!     max_interactions: 200,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! while sim.step().is_some() {}
//! assert!(sim.is_complete());
//! ```

use opinion_events::{
    CompletionReport, InteractionResult, Opinion, OpinionCounts, OpinionSnapshot, Pairing,
    ParticipantChange, ProgressReport, Statistics, TerminationReason, ZealotCounts,
};
use rand::distributions::Open01;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{Agent, AgentId};
use crate::belief::BeliefDynamics;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::network::{NetworkBuilder, NetworkSummary};
use crate::observer::SimulationObserver;
use crate::pairing::PairFinder;

/// Lifecycle of a controller. Pausing is up to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPhase {
    Uninitialized,
    Ready,
    Running,
    Complete,
}

pub struct SimulationController {
    config: SimulationConfig,
    rng: SmallRng,
    run_id: Uuid,
    agents: Vec<Agent>,
    network: NetworkSummary,
    pair_finder: PairFinder,
    dynamics: BeliefDynamics,
    interaction_count: u64,
    counts: OpinionCounts,
    zealots: ZealotCounts,
    history: VecDeque<OpinionSnapshot>,
    current_pairing: Option<Pairing>,
    phase: SimulationPhase,
    termination: Option<TerminationReason>,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl SimulationController {
    /// Creates an uninitialized controller drawing from a generator seeded
    /// with `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: SmallRng) -> Self {
        let config = SimulationConfig::default();
        Self {
            pair_finder: PairFinder::from_config(&config),
            dynamics: BeliefDynamics::from_config(&config),
            config,
            rng,
            run_id: Uuid::nil(),
            agents: Vec::new(),
            network: NetworkSummary::default(),
            interaction_count: 0,
            counts: OpinionCounts::default(),
            zealots: ZealotCounts::default(),
            history: VecDeque::new(),
            current_pairing: None,
            phase: SimulationPhase::Uninitialized,
            termination: None,
            observers: Vec::new(),
        }
    }

    /// Registers an observer. Observers survive re-initialization.
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Starts a new run, discarding any previous one.
    ///
    /// The configuration is validated before anything is touched, so a
    /// rejected configuration leaves the controller as it was.
    pub fn initialize(&mut self, config: SimulationConfig) -> Result<(), SimError> {
        config.validate()?;
        if !config.homophily_is_recommended() {
            warn!(
                homophily = config.homophily,
                "homophily outside the recommended range 0.5..=0.95"
            );
        }

        let run_id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let (mut agents, zealots) = populate(&config, &mut self.rng);
        let network = NetworkBuilder::from_config(&config).build(&mut agents, &mut self.rng);

        self.counts = OpinionCounts::tally(agents.iter().map(Agent::opinion));
        self.run_id = run_id;
        self.agents = agents;
        self.zealots = zealots;
        self.network = network;
        self.pair_finder = PairFinder::from_config(&config);
        self.dynamics = BeliefDynamics::from_config(&config);
        self.interaction_count = 0;
        self.history.clear();
        self.history.push_back(OpinionSnapshot::new(0, self.counts));
        self.current_pairing = None;
        self.termination = None;
        self.phase = SimulationPhase::Ready;
        self.config = config;

        info!(
            run_id = %self.run_id,
            population = self.agents.len(),
            red = self.counts.red,
            blue = self.counts.blue,
            red_zealots = self.zealots.red,
            blue_zealots = self.zealots.blue,
            edges = self.network.edges,
            isolated = self.network.isolated,
            "simulation initialized"
        );

        Ok(())
    }

    /// Performs one interaction.
    ///
    /// Returns `None` once the run is complete, before initialization, and
    /// on the step where no usable pair is found (which completes the run).
    pub fn step(&mut self) -> Option<InteractionResult> {
        match self.phase {
            SimulationPhase::Uninitialized => {
                warn!("step called before initialize");
                return None;
            }
            SimulationPhase::Complete => return None,
            SimulationPhase::Ready | SimulationPhase::Running => {}
        }

        if let Some(previous) = self.current_pairing.take() {
            self.agents[previous.first].clear_pairing();
            self.agents[previous.second].clear_pairing();
        }

        let pairing = match self.pair_finder.find(&self.agents, &mut self.rng) {
            Some(pairing) => pairing,
            None => {
                warn!(
                    interaction = self.interaction_count,
                    "no usable pair left in the network"
                );
                self.complete(TerminationReason::NoPairAvailable);
                return None;
            }
        };
        self.phase = SimulationPhase::Running;

        let interaction = self.interaction_count + 1;
        let (a, b) = (pairing.first, pairing.second);
        debug_assert_ne!(a, b, "pair must be two distinct agents");

        self.agents[a].mark_paired(interaction);
        self.agents[b].mark_paired(interaction);

        // Both sides update against the other's state from before this step
        let a_view = self.agents[a].as_counterpart();
        let b_view = self.agents[b].as_counterpart();
        let a_susceptibility = BeliefDynamics::susceptibility(&self.agents[a], &self.agents);
        let b_susceptibility = BeliefDynamics::susceptibility(&self.agents[b], &self.agents);

        let a_changed = self.dynamics.update(
            &mut self.agents[a],
            &b_view,
            a_susceptibility,
            interaction,
            &mut self.rng,
        );
        let b_changed = self.dynamics.update(
            &mut self.agents[b],
            &a_view,
            b_susceptibility,
            interaction,
            &mut self.rng,
        );

        self.interaction_count = interaction;
        if a_changed || b_changed {
            self.recount();
            debug!(
                interaction,
                red = self.counts.red,
                blue = self.counts.blue,
                "opinion flip"
            );
        }

        if interaction % self.config.tuning.history_interval == 0 {
            self.record_history();
        }

        let termination = self.check_termination();
        self.current_pairing = Some(pairing.clone());

        let result = InteractionResult {
            interaction,
            first: participant_change(a_view.belief, a_view.is_zealot, &self.agents[a]),
            second: participant_change(b_view.belief, b_view.is_zealot, &self.agents[b]),
            counts: self.counts,
            pairing,
            is_complete: termination.is_some(),
        };
        debug!(
            interaction,
            first = a,
            second = b,
            hops = result.pairing.hops(),
            "interaction"
        );

        for observer in self.observers.iter_mut() {
            observer.on_interaction(&result);
        }
        if interaction % self.config.tuning.progress_interval == 0 {
            let report =
                ProgressReport::new(interaction, self.config.max_interactions, self.counts);
            for observer in self.observers.iter_mut() {
                observer.on_progress(&report);
            }
        }
        if let Some(reason) = termination {
            self.complete(reason);
        }

        Some(result)
    }

    /// Steps until the run is complete and returns the final statistics.
    pub fn run_to_completion(&mut self) -> Statistics {
        while self.phase != SimulationPhase::Complete {
            if self.step().is_none() && self.phase != SimulationPhase::Complete {
                break;
            }
        }
        self.statistics()
    }

    /// Read-only view of the current state.
    pub fn statistics(&self) -> Statistics {
        Statistics {
            run_id: self.run_id,
            population_size: self.agents.len(),
            interaction_count: self.interaction_count,
            counts: self.counts,
            zealots: self.zealots,
            history: self.history.iter().copied().collect(),
            current_pairing: self.current_pairing.clone(),
            is_complete: self.is_complete(),
            termination: self.termination,
        }
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SimulationPhase::Complete
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    pub fn opinion_counts(&self) -> OpinionCounts {
        self.counts
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn network_summary(&self) -> &NetworkSummary {
        &self.network
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn current_pairing(&self) -> Option<&Pairing> {
        self.current_pairing.as_ref()
    }

    fn recount(&mut self) {
        self.counts = OpinionCounts::tally(self.agents.iter().map(Agent::opinion));
        debug_assert_eq!(self.counts.total(), self.agents.len());
    }

    fn record_history(&mut self) {
        self.history
            .push_back(OpinionSnapshot::new(self.interaction_count, self.counts));
        while self.history.len() > self.config.tuning.history_capacity {
            self.history.pop_front();
        }
    }

    /// Dominance first, then the interaction cap.
    fn check_termination(&self) -> Option<TerminationReason> {
        if let Some(winner) = self.counts.dominant() {
            return Some(TerminationReason::Dominance { winner });
        }
        if self.interaction_count >= self.config.max_interactions {
            return Some(TerminationReason::InteractionCap);
        }
        None
    }

    fn complete(&mut self, reason: TerminationReason) {
        self.phase = SimulationPhase::Complete;
        self.termination = Some(reason);

        let report = CompletionReport {
            interaction: self.interaction_count,
            counts: self.counts,
            reason,
        };
        info!(
            interaction = self.interaction_count,
            red = self.counts.red,
            blue = self.counts.blue,
            reason = ?reason,
            "simulation complete"
        );
        for observer in self.observers.iter_mut() {
            observer.on_complete(&report);
        }
    }
}

/// Creates the population: the first `round(n * red_proportion)` agents are
/// red, the rest blue, and the first `round(group * fraction)` of each group
/// are zealots.
fn populate<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> (Vec<Agent>, ZealotCounts) {
    let n = config.population_size;
    let red_count = ((n as f64 * config.red_proportion).round() as usize).min(n);
    let blue_count = n - red_count;
    let zealots = ZealotCounts {
        red: ((red_count as f64 * config.red_zealot_fraction).round() as usize).min(red_count),
        blue: ((blue_count as f64 * config.blue_zealot_fraction).round() as usize).min(blue_count),
    };

    let agents = (0..n)
        .map(|id| {
            let (opinion, rank, zealot_quota) = if id < red_count {
                (Opinion::Red, id, zealots.red)
            } else {
                (Opinion::Blue, id - red_count, zealots.blue)
            };
            if rank < zealot_quota {
                Agent::zealot(id, opinion)
            } else {
                let magnitude: f64 = rng.sample(Open01);
                let belief = match opinion {
                    Opinion::Red => -magnitude,
                    Opinion::Blue => magnitude,
                };
                Agent::new(id, belief)
            }
        })
        .collect();

    (agents, zealots)
}

fn participant_change(belief_before: f64, is_zealot: bool, agent: &Agent) -> ParticipantChange {
    ParticipantChange {
        agent_id: agent.id(),
        is_zealot,
        belief_before,
        belief_after: agent.belief(),
        opinion_before: Opinion::from_belief(belief_before),
        opinion_after: agent.opinion(),
    }
}
