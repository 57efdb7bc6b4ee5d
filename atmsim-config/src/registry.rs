//! Callback registry sizing.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of callback slots a registry starts with.
pub const DEFAULT_MAX_CALLBACKS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegistryConfig {
    /// Upper bound on simultaneously registered callbacks.
    #[validate(range(min = 1, max = 1024))]
    pub max_callbacks: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_callbacks: DEFAULT_MAX_CALLBACKS,
        }
    }
}
