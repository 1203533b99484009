//! Opinion Dynamics Simulation Engine
//!
//! Agents holding continuous beliefs interact pairwise over a fixed,
//! homophily-biased network. Zealots influence others but never change.
//!
//! - [`network`]: homophily-biased graph construction
//! - [`pairing`]: direct and search-based pair selection
//! - [`belief`]: the belief update rule
//! - [`controller`]: run lifecycle, counters, history and termination
//! - [`observer`]: push notifications from inside `step()`
//! - [`output`]: JSONL event log and statistics files

pub mod agent;
pub mod belief;
pub mod config;
pub mod controller;
pub mod error;
pub mod network;
pub mod observer;
pub mod output;
pub mod pairing;

pub use agent::{Agent, AgentId, Counterpart, InteractionRecord};
pub use belief::BeliefDynamics;
pub use config::{SimulationConfig, TuningConfig};
pub use controller::{SimulationController, SimulationPhase};
pub use error::{ConfigError, SimError};
pub use network::{NetworkBuilder, NetworkSummary};
pub use observer::{Recording, RecordingObserver, SimulationObserver};
pub use output::{write_statistics, EventLogger, RunSummary};
pub use pairing::{PairFinder, SearchTree};

pub use opinion_events;
