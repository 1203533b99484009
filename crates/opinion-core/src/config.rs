//! Configuration System
//!
//! Run parameters and algorithm tuning, loadable from a TOML file so
//! experiments can be adjusted without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Recommended homophily range. Values outside it are accepted with a warning.
pub const RECOMMENDED_HOMOPHILY: (f64, f64) = (0.5, 0.95);

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of agents
    pub population_size: usize,
    /// Share of the population starting red
    pub red_proportion: f64,
    /// Share of the red group that are zealots
    pub red_zealot_fraction: f64,
    /// Share of the blue group that are zealots
    pub blue_zealot_fraction: f64,
    /// Probability that a sought connection partner shares opinion
    pub homophily: f64,
    /// Interaction cap after which the run completes
    pub max_interactions: u64,
    /// Probability that a regular agent adopts a zealot's belief on contact
    pub zealot_influence_probability: f64,
    /// Algorithm constants
    pub tuning: TuningConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            red_proportion: 0.5,
            red_zealot_fraction: 0.05,
            blue_zealot_fraction: 0.05,
            homophily: 0.7,
            max_interactions: 5000,
            zealot_influence_probability: 1.0,
            tuning: TuningConfig::default(),
        }
    }
}

/// Constants of the network builder, pair finder and update rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Smallest target degree drawn per agent
    pub min_degree: usize,
    /// Largest target degree drawn per agent
    pub max_degree: usize,
    /// Attempts per agent to fill its target degree
    pub connection_attempts: usize,
    /// Probability of trying a direct pairing first
    pub direct_pair_probability: f64,
    /// Attempts per direct pairing round
    pub direct_pair_attempts: usize,
    /// Breadth-first search rounds before the final fallback
    pub indirect_pair_attempts: usize,
    /// Scale of belief movement between regular agents
    pub influence_rate: f64,
    /// Interactions between history snapshots
    pub history_interval: u64,
    /// Maximum retained history snapshots
    pub history_capacity: usize,
    /// Interactions between progress notifications
    pub progress_interval: u64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            min_degree: 1,
            max_degree: 3,
            connection_attempts: 50,
            direct_pair_probability: 0.7,
            direct_pair_attempts: 5,
            indirect_pair_attempts: 3,
            influence_rate: 0.1,
            history_interval: 10,
            history_capacity: 1000,
            progress_interval: 50,
        }
    }
}

impl SimulationConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string. Missing fields take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulation);
        }
        check_unit("red_proportion", self.red_proportion)?;
        check_unit("red_zealot_fraction", self.red_zealot_fraction)?;
        check_unit("blue_zealot_fraction", self.blue_zealot_fraction)?;
        check_unit("homophily", self.homophily)?;
        check_unit(
            "zealot_influence_probability",
            self.zealot_influence_probability,
        )?;
        if self.max_interactions == 0 {
            return Err(ConfigError::InvalidMaxInteractions);
        }
        self.tuning.validate()
    }

    /// True if homophily lies in the recommended range.
    pub fn homophily_is_recommended(&self) -> bool {
        let (low, high) = RECOMMENDED_HOMOPHILY;
        self.homophily >= low && self.homophily <= high
    }
}

impl TuningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_degree == 0 {
            return Err(ConfigError::InvalidTuning("min_degree must be at least 1".into()));
        }
        if self.min_degree > self.max_degree {
            return Err(ConfigError::InvalidTuning(format!(
                "min_degree {} exceeds max_degree {}",
                self.min_degree, self.max_degree
            )));
        }
        if self.connection_attempts == 0 {
            return Err(ConfigError::InvalidTuning(
                "connection_attempts must be positive".into(),
            ));
        }
        if self.direct_pair_attempts == 0 || self.indirect_pair_attempts == 0 {
            return Err(ConfigError::InvalidTuning(
                "pairing attempts must be positive".into(),
            ));
        }
        check_unit("tuning.direct_pair_probability", self.direct_pair_probability)?;
        if !self.influence_rate.is_finite() || self.influence_rate < 0.0 {
            return Err(ConfigError::InvalidTuning(format!(
                "influence_rate must be a non-negative number, got {}",
                self.influence_rate
            )));
        }
        if self.history_interval == 0 || self.history_capacity == 0 || self.progress_interval == 0 {
            return Err(ConfigError::InvalidTuning(
                "history and progress intervals and capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Rejects values outside [0, 1], NaN included.
fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.max_interactions, 5000);
        assert_eq!(config.zealot_influence_probability, 1.0);
        assert_eq!(config.tuning.connection_attempts, 50);
        assert_eq!(config.tuning.history_capacity, 1000);
        assert!(config.validate().is_ok());
        assert!(config.homophily_is_recommended());
    }

    #[test]
    fn test_rejects_empty_population() {
        let config = SimulationConfig {
            population_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPopulation)));
    }

    #[test]
    fn test_rejects_out_of_range_fractions() {
        let config = SimulationConfig {
            red_proportion: 1.2,
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, "red_proportion"),
            other => panic!("unexpected result: {:?}", other),
        }

        let config = SimulationConfig {
            blue_zealot_fraction: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            homophily: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_interaction_cap() {
        let config = SimulationConfig {
            max_interactions: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxInteractions)));
    }

    #[test]
    fn test_rejects_bad_tuning() {
        let mut config = SimulationConfig::default();
        config.tuning.min_degree = 4;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTuning(_))));

        let mut config = SimulationConfig::default();
        config.tuning.history_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_low_homophily_is_valid_but_not_recommended() {
        let config = SimulationConfig {
            homophily: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.homophily_is_recommended());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            population_size = 40
            homophily = 0.9

            [tuning]
            influence_rate = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.population_size, 40);
        assert_eq!(config.homophily, 0.9);
        assert_eq!(config.red_proportion, 0.5);
        assert_eq!(config.tuning.influence_rate, 0.2);
        assert_eq!(config.tuning.max_degree, 3);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SimulationConfig {
            population_size: 12,
            red_proportion: 0.25,
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        let parsed = SimulationConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SimulationConfig::from_toml_str("population_size = \"many\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
