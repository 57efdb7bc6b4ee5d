//! # atmsim-engine
//!
//! Request facade of the ATM configuration manager, its wiring from
//! configuration, and a scenario runner that records what clients observe.

pub mod error;
pub mod manager;
pub mod scenario;
pub mod simulator;

pub use error::{EngineError, ScenarioError};
pub use manager::{AtmConfigManager, Request};
pub use scenario::{Scenario, ScenarioRunner, Transcript, TranscriptEntry};
pub use simulator::Simulator;

pub mod prelude {
    pub use super::{
        AtmConfigManager, EngineError, Request, Scenario, ScenarioError, ScenarioRunner,
        Simulator, Transcript, TranscriptEntry,
    };
}
