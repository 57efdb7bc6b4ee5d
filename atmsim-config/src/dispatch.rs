//! Callback delivery and deferred scheduling parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How completion callbacks run when the process starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// On the thread that issued the request.
    #[default]
    Immediate,
    /// Through the scheduler's worker threads.
    Deferred,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode: DispatchMode,

    /// Scheduler priority for deferred callbacks, 0 being the most urgent.
    pub priority: u8,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Immediate,
            priority: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SchedulerConfig {
    #[validate(range(min = 1, max = 64))]
    pub workers: usize,

    #[validate(range(min = 1, max = 16))]
    pub priority_levels: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().clamp(1, 64),
            priority_levels: 4,
        }
    }
}
