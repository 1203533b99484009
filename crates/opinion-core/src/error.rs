//! Error types for configuration and output.

use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("population size must be greater than zero")]
    InvalidPopulation,

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("max_interactions must be greater than zero")]
    InvalidMaxInteractions,

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Errors surfaced by the simulation and its output writers.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
