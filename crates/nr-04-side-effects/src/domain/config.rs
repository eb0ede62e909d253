//! # Side-Effect Configuration

use super::entities::ContainerId;
use serde::{Deserialize, Serialize};

/// Side-effect executor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideEffectConfig {
    /// Base URL; the item name is appended as one encoded path segment.
    pub resource_base_url: String,
    /// Fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Container artifacts are written to.
    pub container: ContainerId,
    /// Contract method recording an item's address.
    pub link_method: String,
}

impl Default for SideEffectConfig {
    fn default() -> Self {
        Self {
            resource_base_url: "https://www.nyan.cat/cats/".to_string(),
            fetch_timeout_secs: 30,
            container: ContainerId::default(),
            link_method: "setAddress".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: SideEffectConfig =
            serde_json::from_str(r#"{"link_method":"setUri"}"#).unwrap();
        assert_eq!(config.link_method, "setUri");
        assert_eq!(config.fetch_timeout_secs, 30);
    }
}
