//! Authenticator configuration.

use serde::{Deserialize, Serialize};
use shared_types::ScriptHash;

/// The single call the relay will co-sign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticatorConfig {
    /// Contract every accepted request must call.
    pub contract: ScriptHash,
    /// Method every accepted request must call.
    pub method: String,
}

impl AuthenticatorConfig {
    /// Contract the relay ships configured for.
    pub const DEFAULT_CONTRACT: ScriptHash = ScriptHash::new([
        0x80, 0x75, 0x78, 0xf0, 0x5d, 0x29, 0xa7, 0xdf, 0x02, 0xfe, 0x39, 0x61, 0xd3, 0xe0, 0x14,
        0x5d, 0x83, 0x59, 0x98, 0xbc,
    ]);
}

impl Default for AuthenticatorConfig {
    fn default() -> Self {
        Self {
            contract: Self::DEFAULT_CONTRACT,
            method: "mint".to_string(),
        }
    }
}
