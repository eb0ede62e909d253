//! # Inbound Ports

use crate::domain::{AdmissionError, DepositReceipt};
use async_trait::async_trait;
use shared_types::ScriptHash;

/// Admission API - inbound port.
#[async_trait]
pub trait AdmissionApi: Send + Sync {
    /// Add fee credit for `beneficiary` and wait until it is finalized.
    async fn ensure_deposit(&self, beneficiary: ScriptHash)
        -> Result<DepositReceipt, AdmissionError>;

    /// Fee-asset balance of the relay account.
    async fn balance(&self) -> Result<i64, AdmissionError>;
}
