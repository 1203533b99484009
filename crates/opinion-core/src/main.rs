//! Headless opinion dynamics driver.
//!
//! Runs one simulation to completion and optionally writes a JSONL event
//! log and a statistics file.

use clap::Parser;
use opinion_core::{
    write_statistics, EventLogger, RunSummary, SimError, SimulationConfig, SimulationController,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "opinion_sim")]
#[command(about = "Opinion dynamics on a homophily network with zealots")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of agents
    #[arg(long)]
    population: Option<usize>,

    /// Share of agents starting red
    #[arg(long)]
    red_proportion: Option<f64>,

    /// Share of red agents that are zealots
    #[arg(long)]
    red_zealots: Option<f64>,

    /// Share of blue agents that are zealots
    #[arg(long)]
    blue_zealots: Option<f64>,

    /// Probability of seeking same-opinion connections
    #[arg(long)]
    homophily: Option<f64>,

    /// Interaction cap
    #[arg(long)]
    max_interactions: Option<u64>,

    /// Probability of adopting a zealot's belief on contact
    #[arg(long)]
    zealot_influence: Option<f64>,

    /// Write every interaction to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write final statistics to this JSON file
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn effective_config(&self) -> Result<SimulationConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(value) = self.red_proportion {
            config.red_proportion = value;
        }
        if let Some(value) = self.red_zealots {
            config.red_zealot_fraction = value;
        }
        if let Some(value) = self.blue_zealots {
            config.blue_zealot_fraction = value;
        }
        if let Some(value) = self.homophily {
            config.homophily = value;
        }
        if let Some(value) = self.max_interactions {
            config.max_interactions = value;
        }
        if let Some(value) = self.zealot_influence {
            config.zealot_influence_probability = value;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = args.effective_config()?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    let mut sim = SimulationController::new(args.seed);

    let logger = match &args.events {
        Some(path) => {
            let logger = Rc::new(RefCell::new(EventLogger::new(path)?));
            sim.add_observer(Box::new(Rc::clone(&logger)));
            info!("Logging events to {}", path.display());
            Some(logger)
        }
        None => None,
    };

    info!(seed = args.seed, "starting simulation");
    sim.initialize(config)?;
    let stats = sim.run_to_completion();

    if let Some(logger) = logger {
        let mut logger = logger.borrow_mut();
        logger.flush()?;
        if logger.write_failures() > 0 {
            return Err(SimError::Output(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{} event records could not be written", logger.write_failures()),
            )));
        }
    }

    if let Some(path) = &args.stats {
        write_statistics(path, &stats)?;
        info!("Wrote statistics to {}", path.display());
    }

    println!("{}", RunSummary::from_statistics(&stats));
    Ok(())
}
