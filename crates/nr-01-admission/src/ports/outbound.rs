//! # Outbound Ports

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_crypto::SigningContext;
use shared_types::{
    ExecutionResult, LedgerError, ScriptHash, SentTransaction, TxHash, VmState,
};

/// Ledger access the controller needs - outbound port.
#[async_trait]
pub trait DepositLedger: Send + Sync {
    /// Wrap `script` in a transaction with `signer` as its only signer,
    /// sign it and submit it.
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError>;

    /// Block until `sent` is included, or its validity bound passes.
    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError>;

    /// Balance of `account` in `asset`.
    async fn balance_of(&self, asset: ScriptHash, account: ScriptHash)
        -> Result<i64, LedgerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock ledger recording every submitted script.
#[derive(Default)]
pub struct MockDepositLedger {
    /// Scripts submitted with their sender, in order.
    pub sent: Mutex<Vec<(ScriptHash, Vec<u8>)>>,
    /// Execution state reported by `wait`.
    pub fault: bool,
    /// Fail submission outright?
    pub should_fail: bool,
    /// Balance reported for every account.
    pub balance: i64,
}

#[async_trait]
impl DepositLedger for MockDepositLedger {
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError> {
        if self.should_fail {
            return Err(LedgerError::Rpc("Mock failure".to_string()));
        }
        let mut sent = self.sent.lock();
        sent.push((signer.account(), script.clone()));
        let mut hash = TxHash::digest(&script).as_bytes().to_owned();
        hash[0] = sent.len() as u8;
        Ok(SentTransaction {
            hash: TxHash::new(hash),
            valid_until_block: 100,
        })
    }

    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError> {
        Ok(ExecutionResult {
            tx_hash: sent.hash,
            block: 1,
            vm_state: if self.fault { VmState::Fault } else { VmState::Halt },
            exception: self.fault.then(|| "mock fault".to_string()),
        })
    }

    async fn balance_of(
        &self,
        _asset: ScriptHash,
        _account: ScriptHash,
    ) -> Result<i64, LedgerError> {
        if self.should_fail {
            return Err(LedgerError::Rpc("Mock failure".to_string()));
        }
        Ok(self.balance)
    }
}
