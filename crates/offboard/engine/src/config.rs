//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the process engine.
///
/// The same permission threshold gates process creation and every step
/// execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum permission level required to initiate or drive a process
    pub required_level: u8,
    /// Upper bound on a single handler invocation, in seconds
    pub handler_timeout_secs: u64,
    /// Re-runs after a failed or timed-out handler invocation
    pub handler_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_level: 6,
            handler_timeout_secs: 30,
            handler_retries: 2,
        }
    }
}

impl EngineConfig {
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }

    pub fn with_required_level(mut self, level: u8) -> Self {
        self.required_level = level;
        self
    }

    pub fn with_handler_timeout_secs(mut self, secs: u64) -> Self {
        self.handler_timeout_secs = secs;
        self
    }

    pub fn with_handler_retries(mut self, retries: u32) -> Self {
        self.handler_retries = retries;
        self
    }
}
