//! # Orchestrator Configuration

use serde::{Deserialize, Serialize};

/// Co-signing orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoSigningConfig {
    /// Requests processed at once. `1` handles events strictly in order.
    pub max_concurrent_requests: usize,
}

impl Default for CoSigningConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 1,
        }
    }
}
