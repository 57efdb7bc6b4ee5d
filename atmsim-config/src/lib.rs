//! # atmsim Configuration
//!
//! Layered configuration for the ATM configuration manager simulator.
//!
//! ## Sources, lowest precedence first
//! 1. Built-in defaults
//! 2. `config/atmsim.yaml`
//! 3. `config/<ATMSIM_ENV>.yaml`
//! 4. `ATMSIM_*` environment variables, nested with `__`
//!    (e.g. `ATMSIM_REGISTRY__MAX_CALLBACKS=32`)

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod dispatch;
mod error;
mod registry;
mod telemetry;
mod validation;

pub use dispatch::{DispatchConfig, DispatchMode, SchedulerConfig};
pub use error::ConfigError;
pub use registry::{RegistryConfig, DEFAULT_MAX_CALLBACKS};
pub use telemetry::{LogLevel, TelemetryConfig};

const BASE_FILE: &str = "config/atmsim.yaml";
const ENV_PREFIX: &str = "ATMSIM_";

/// Top-level configuration container.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AtmSimConfig {
    #[validate(nested)]
    pub registry: RegistryConfig,

    #[validate(nested)]
    pub dispatch: DispatchConfig,

    #[validate(nested)]
    pub scheduler: SchedulerConfig,

    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl AtmSimConfig {
    /// Load configuration from the default files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(AtmSimConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("ATMSIM_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from one file, still honouring `ATMSIM_*` overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment =
            Figment::from(Serialized::defaults(AtmSimConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    /// Runs every field and cross-section check.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        validation::validate_dispatch_priority(&self.dispatch, &self.scheduler).map_err(|_| {
            ConfigError::Inconsistent(format!(
                "dispatch.priority {} must be below scheduler.priority_levels {}",
                self.dispatch.priority, self.scheduler.priority_levels
            ))
        })
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.check()?;
        Ok(config)
    }
}
