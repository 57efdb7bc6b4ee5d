use std::path::PathBuf;

use thiserror::Error;

use atmsim_config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start scheduler workers: {0}")]
    Scheduler(#[from] std::io::Error),

    #[error("Failed to set up metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Step {step}: no registration named '{alias}'")]
    UnknownAlias { step: usize, alias: String },

    #[error("Step {step}: unknown {field} '{name}'")]
    UnknownName {
        step: usize,
        field: &'static str,
        name: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
