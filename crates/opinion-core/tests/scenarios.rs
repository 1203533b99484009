//! Scenario and invariant tests for full simulation runs.

use opinion_core::opinion_events::{Opinion, OpinionCounts, PairingKind, TerminationReason};
use opinion_core::{network, Agent, EventLogger, SimulationConfig, SimulationController};
use std::cell::RefCell;
use std::rc::Rc;

fn balanced(population_size: usize, max_interactions: u64) -> SimulationConfig {
    SimulationConfig {
        population_size,
        max_interactions,
        ..Default::default()
    }
}

#[test]
fn test_single_opinion_population_completes_on_first_check() {
    let mut sim = SimulationController::new(42);
    sim.initialize(SimulationConfig {
        population_size: 10,
        red_proportion: 1.0,
        red_zealot_fraction: 0.0,
        blue_zealot_fraction: 0.0,
        homophily: 0.7,
        ..Default::default()
    })
    .unwrap();

    assert_eq!(sim.opinion_counts(), OpinionCounts { red: 10, blue: 0 });
    assert!(!sim.is_complete());

    let result = sim.step().unwrap();
    assert!(result.is_complete);
    assert_eq!(result.interaction, 1);
    assert_eq!(
        sim.termination(),
        Some(TerminationReason::Dominance { winner: Opinion::Red })
    );

    // Complete runs do nothing further
    assert!(sim.step().is_none());
    assert_eq!(sim.interaction_count(), 1);
}

#[test]
fn test_zealot_contact_snaps_belief() {
    // One red zealot, three regular blue agents
    let mut sim = SimulationController::new(8);
    sim.initialize(SimulationConfig {
        population_size: 4,
        red_proportion: 0.25,
        red_zealot_fraction: 1.0,
        blue_zealot_fraction: 0.0,
        zealot_influence_probability: 1.0,
        ..Default::default()
    })
    .unwrap();

    let zealot = sim.agents().iter().find(|a| a.is_zealot()).unwrap().id();
    assert_eq!(sim.agent(zealot).unwrap().belief(), -1.0);

    let mut observed = false;
    while let Some(result) = sim.step() {
        if result.pairing.involves(zealot) {
            let other = if result.first.agent_id == zealot {
                &result.second
            } else {
                &result.first
            };
            assert_eq!(other.belief_after, -1.0);
            observed = true;
            break;
        }
    }
    assert!(observed, "zealot never interacted");
    assert_eq!(sim.agent(zealot).unwrap().belief(), -1.0);
}

#[test]
fn test_interaction_cap_is_exact() {
    let mut sim = SimulationController::new(3);
    sim.initialize(SimulationConfig {
        population_size: 40,
        red_zealot_fraction: 0.5,
        blue_zealot_fraction: 0.5,
        max_interactions: 300,
        ..Default::default()
    })
    .unwrap();

    let mut steps = 0;
    while sim.step().is_some() {
        steps += 1;
    }

    assert_eq!(steps, 300);
    assert_eq!(sim.interaction_count(), 300);
    assert_eq!(sim.termination(), Some(TerminationReason::InteractionCap));
    assert!(sim.step().is_none());
    assert_eq!(sim.interaction_count(), 300);
}

#[test]
fn test_invariants_hold_throughout_runs() {
    for seed in 0..8 {
        let mut sim = SimulationController::new(seed);
        sim.initialize(SimulationConfig {
            population_size: 50,
            red_proportion: 0.4,
            red_zealot_fraction: 0.1,
            blue_zealot_fraction: 0.1,
            homophily: 0.6,
            max_interactions: 800,
            ..Default::default()
        })
        .unwrap();

        assert!(network::is_symmetric(sim.agents()));
        let zealots: Vec<(usize, f64)> = sim
            .agents()
            .iter()
            .filter(|a| a.is_zealot())
            .map(|a| (a.id(), a.belief()))
            .collect();
        assert!(!zealots.is_empty());

        while let Some(result) = sim.step() {
            let counts = sim.opinion_counts();
            assert_eq!(counts.red + counts.blue, 50);
            assert_eq!(result.counts, counts);

            for agent in sim.agents() {
                assert!((-1.0..=1.0).contains(&agent.belief()));
            }
            for &(id, belief) in &zealots {
                assert_eq!(sim.agent(id).unwrap().belief(), belief);
            }

            let path = &result.pairing.path;
            assert!(path.len() >= 2);
            assert_ne!(result.pairing.first, result.pairing.second);
            for hop in path.windows(2) {
                assert!(sim.agent(hop[0]).unwrap().has_neighbor(hop[1]));
            }
            if result.pairing.kind == PairingKind::Direct {
                assert_eq!(path.len(), 2);
            }
        }
        assert!(network::is_symmetric(sim.agents()));
    }
}

#[test]
fn test_statistics_are_idempotent() {
    let mut sim = SimulationController::new(11);
    sim.initialize(balanced(30, 500)).unwrap();

    for _ in 0..37 {
        sim.step();
    }

    let first = sim.statistics();
    let second = sim.statistics();
    assert_eq!(first, second);
    assert_eq!(first.interaction_count, sim.interaction_count());
}

#[test]
fn test_interaction_history_is_recorded_for_both_sides() {
    let mut sim = SimulationController::new(21);
    sim.initialize(SimulationConfig {
        red_zealot_fraction: 0.2,
        blue_zealot_fraction: 0.2,
        ..balanced(25, 200)
    })
    .unwrap();
    let stats = sim.run_to_completion();

    let records: usize = sim
        .agents()
        .iter()
        .map(|a| a.interaction_history().len())
        .sum();
    assert_eq!(records as u64, 2 * stats.interaction_count);

    for agent in sim.agents() {
        let timestamps: Vec<u64> = agent
            .interaction_history()
            .iter()
            .map(|r| r.timestamp)
            .collect();
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_regular_agents_far_from_other_side_hold_steady() {
    // Without cross-opinion neighbors nobody is susceptible, and without
    // zealots nothing else moves beliefs.
    let mut sim = SimulationController::new(2);
    sim.initialize(SimulationConfig {
        population_size: 30,
        red_proportion: 0.5,
        red_zealot_fraction: 0.0,
        blue_zealot_fraction: 0.0,
        homophily: 1.0,
        max_interactions: 400,
        ..Default::default()
    })
    .unwrap();

    let isolated_from_other_side: Vec<(usize, f64)> = sim
        .agents()
        .iter()
        .filter(|a| {
            a.neighbors()
                .iter()
                .all(|&n| sim.agent(n).map(Agent::opinion) == Some(a.opinion()))
        })
        .map(|a| (a.id(), a.belief()))
        .collect();
    assert!(!isolated_from_other_side.is_empty());

    sim.run_to_completion();

    for (id, belief) in isolated_from_other_side {
        assert_eq!(sim.agent(id).unwrap().belief(), belief);
    }
}

#[test]
fn test_event_log_covers_whole_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let logger = Rc::new(RefCell::new(EventLogger::new(&path).unwrap()));

    let mut sim = SimulationController::new(6);
    sim.add_observer(Box::new(Rc::clone(&logger)));
    sim.initialize(SimulationConfig {
        red_zealot_fraction: 0.5,
        blue_zealot_fraction: 0.5,
        ..balanced(20, 120)
    })
    .unwrap();
    sim.run_to_completion();
    logger.borrow_mut().flush().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let kinds: Vec<String> = content
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["kind"].as_str().unwrap().to_string()
        })
        .collect();

    assert_eq!(kinds.iter().filter(|k| *k == "interaction").count(), 120);
    assert_eq!(kinds.iter().filter(|k| *k == "progress").count(), 2);
    assert_eq!(kinds.last().map(String::as_str), Some("complete"));
    assert_eq!(logger.borrow().record_count(), 123);
}

#[test]
fn test_sample_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../opinion.toml");
    let config = SimulationConfig::from_file(path).unwrap();

    assert_eq!(config, SimulationConfig::default());
    assert!(config.validate().is_ok());
}
