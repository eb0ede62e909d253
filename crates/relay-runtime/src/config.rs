//! # Relay Configuration
//!
//! One TOML file, one section per subsystem. Every section is optional and
//! falls back to its defaults.
//!
//! ```toml
//! [relay]
//! secret_key = "<64 hex chars>"
//! network_magic = 860833102
//! listen_address = "0.0.0.0:5555"
//!
//! [authenticator]
//! contract = "0xbc9859835d14e0d36139fe02dfa7295df0787580"
//! method = "mint"
//!
//! [cosigning]
//! max_concurrent_requests = 1
//!
//! [deposit]
//! amount = 100000000
//!
//! [side_effects]
//! resource_base_url = "https://www.nyan.cat/cats/"
//! container = "<64 hex chars>"
//!
//! [ledger]
//! block_interval_ms = 1000
//!
//! [logging]
//! json = false
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NR_LISTEN_ADDRESS` | `relay.listen_address` |
//! | `NR_CONTRACT` | `authenticator.contract` |
//! | `NR_LOG_JSON` | `logging.json` |

use crate::adapters::LedgerConfig;
use nr_01_admission::DepositConfig;
use nr_02_authenticator::AuthenticatorConfig;
use nr_03_cosigning::CoSigningConfig;
use nr_04_side_effects::SideEffectConfig;
use serde::Deserialize;
use shared_crypto::{LocalSigner, Secp256k1KeyPair};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File requested
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// An environment override could not be applied.
    #[error("Invalid value in {var}: {reason}")]
    Override {
        /// Variable name
        var: &'static str,
        /// What was wrong
        reason: String,
    },

    /// The relay key is missing or malformed.
    #[error("Invalid relay secret key: {0}")]
    SecretKey(String),

    /// A field holds an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Identity and network of the relay.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    /// Hex-encoded secp256k1 secret key.
    pub secret_key: String,
    /// Network the relay signs for.
    pub network_magic: u32,
    /// HTTP listen address.
    pub listen_address: String,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            network_magic: 0,
            listen_address: "0.0.0.0:5555".to_string(),
        }
    }
}

impl fmt::Debug for RelaySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySection")
            .field("secret_key", &"<redacted>")
            .field("network_magic", &self.network_magic)
            .field("listen_address", &self.listen_address)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Filter used when `RUST_LOG` is unset.
    pub level: Option<String>,
}

/// Complete relay configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Identity and network.
    pub relay: RelaySection,
    /// The call requests must encode.
    pub authenticator: AuthenticatorConfig,
    /// Orchestrator tuning.
    pub cosigning: CoSigningConfig,
    /// Fee credit per deposit.
    pub deposit: DepositConfig,
    /// Resource, store and link-back settings.
    pub side_effects: SideEffectConfig,
    /// Simulated ledger settings.
    pub ledger: LedgerConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Read `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `NR_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("NR_LISTEN_ADDRESS") {
            self.relay.listen_address = addr;
        }
        if let Some(contract) = lookup("NR_CONTRACT") {
            self.authenticator.contract =
                contract.parse().map_err(|e| ConfigError::Override {
                    var: "NR_CONTRACT",
                    reason: format!("{e}"),
                })?;
        }
        if let Some(json) = lookup("NR_LOG_JSON") {
            self.logging.json = match json.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(ConfigError::Override {
                        var: "NR_LOG_JSON",
                        reason: format!("expected a boolean, got {other:?}"),
                    })
                }
            };
        }
        Ok(())
    }

    /// Reject configurations the relay cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.key_pair()?;
        self.listen_address()?;

        if self.authenticator.method.is_empty() {
            return Err(ConfigError::Invalid("authenticator.method is empty".into()));
        }
        if self.cosigning.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "cosigning.max_concurrent_requests must be at least 1".into(),
            ));
        }
        if self.deposit.amount <= 0 {
            return Err(ConfigError::Invalid(format!(
                "deposit.amount must be positive, got {}",
                self.deposit.amount
            )));
        }
        let base = &self.side_effects.resource_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "side_effects.resource_base_url is not an http(s) URL: {base}"
            )));
        }
        if self.side_effects.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "side_effects.fetch_timeout_secs must be positive".into(),
            ));
        }
        if self.side_effects.link_method.is_empty() {
            return Err(ConfigError::Invalid("side_effects.link_method is empty".into()));
        }
        if self.ledger.block_interval_ms == 0 || self.ledger.validity_blocks == 0 {
            return Err(ConfigError::Invalid(
                "ledger.block_interval_ms and ledger.validity_blocks must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parsed HTTP listen address.
    pub fn listen_address(&self) -> Result<SocketAddr, ConfigError> {
        self.relay.listen_address.parse().map_err(|e| {
            ConfigError::Invalid(format!(
                "relay.listen_address {:?}: {e}",
                self.relay.listen_address
            ))
        })
    }

    /// The relay's key pair.
    pub fn key_pair(&self) -> Result<Secp256k1KeyPair, ConfigError> {
        if self.relay.secret_key.trim().is_empty() {
            return Err(ConfigError::SecretKey("relay.secret_key is not set".into()));
        }
        Secp256k1KeyPair::from_hex(&self.relay.secret_key)
            .map_err(|e| ConfigError::SecretKey(e.to_string()))
    }

    /// Signing context for the configured network.
    pub fn signer(&self) -> Result<LocalSigner, ConfigError> {
        Ok(LocalSigner::new(self.key_pair()?, self.relay.network_magic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ScriptHash;
    use std::collections::HashMap;

    const KEY: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    fn minimal() -> RelayConfig {
        RelayConfig::parse(&format!("[relay]\nsecret_key = \"{KEY}\"\n")).unwrap()
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = minimal();
        config.validate().unwrap();

        assert_eq!(config.relay.listen_address, "0.0.0.0:5555");
        assert_eq!(config.authenticator.method, "mint");
        assert_eq!(config.cosigning.max_concurrent_requests, 1);
        assert_eq!(config.deposit.amount, 100_000_000);
        assert_eq!(config.side_effects.link_method, "setAddress");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = RelayConfig::parse(&format!(
            r#"
            [relay]
            secret_key = "{KEY}"
            network_magic = 42
            listen_address = "127.0.0.1:8080"

            [authenticator]
            method = "mintNyan"

            [cosigning]
            max_concurrent_requests = 4

            [side_effects]
            resource_base_url = "http://localhost:9000/cats/"
            "#
        ))
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.relay.network_magic, 42);
        assert_eq!(config.listen_address().unwrap().port(), 8080);
        assert_eq!(config.authenticator.method, "mintNyan");
        assert_eq!(config.cosigning.max_concurrent_requests, 4);
        assert_eq!(config.side_effects.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = RelayConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::SecretKey(_))));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = minimal();
        config.cosigning.max_concurrent_requests = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = minimal();
        config.side_effects.resource_base_url = "ftp://cats/".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = minimal();
        config.relay.listen_address = "nowhere".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("NR_LISTEN_ADDRESS", "127.0.0.1:7000"),
            ("NR_CONTRACT", "0x0102030405060708090a0b0c0d0e0f1011121314"),
            ("NR_LOG_JSON", "true"),
        ]);
        let mut config = minimal();
        config
            .apply_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.relay.listen_address, "127.0.0.1:7000");
        assert_eq!(
            config.authenticator.contract,
            "0102030405060708090a0b0c0d0e0f1011121314".parse::<ScriptHash>().unwrap()
        );
        assert!(config.logging.json);
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut config = minimal();
        let err = config
            .apply_overrides(|var| (var == "NR_LOG_JSON").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Override { var: "NR_LOG_JSON", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, format!("[relay]\nsecret_key = \"{KEY}\"\n")).unwrap();

        let config = RelayConfig::load(&path).unwrap();
        assert_eq!(config.key_pair().unwrap().script_hash(), minimal().key_pair().unwrap().script_hash());

        assert!(matches!(
            RelayConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
