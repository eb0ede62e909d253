//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{ScriptHash, TxHash, GAS_FACTOR};

/// How much credit each deposit adds and until when it is locked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositConfig {
    /// Fee-asset fractions per deposit.
    pub amount: i64,
    /// Block height until which the deposit is locked.
    pub till: u32,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            amount: GAS_FACTOR,
            till: u32::MAX,
        }
    }
}

/// A finalized deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// Account credited.
    pub beneficiary: ScriptHash,
    /// Fee-asset fractions added.
    pub amount: i64,
    /// Transfer transaction.
    pub tx_hash: TxHash,
    /// Block it was included in.
    pub block: u32,
}
