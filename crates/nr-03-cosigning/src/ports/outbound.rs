//! # Outbound Ports

use crate::domain::{CoSigningError, FinalizedMint, Path};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{ExecutionResult, LedgerError, SentTransaction, Transaction, TxHash, VmState};

/// Notary subsystem access - outbound port.
#[async_trait]
pub trait NotaryClient: Send + Sync {
    /// Submit a co-signed transaction of a notary pair.
    async fn submit(&self, tx: Transaction) -> Result<SentTransaction, LedgerError>;

    /// Block until `main` or `fallback` is in a block, or `valid_until_block`
    /// passes. The result names whichever won.
    async fn wait_any(
        &self,
        main: TxHash,
        fallback: TxHash,
        valid_until_block: u32,
    ) -> Result<ExecutionResult, LedgerError>;
}

/// Invoked once per primary finalization - outbound port.
#[async_trait]
pub trait FinalizationHandler: Send + Sync {
    /// Run post-finalization work for `mint`.
    async fn on_primary_finalized(&self, mint: &FinalizedMint) -> Result<(), CoSigningError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock notary that finalizes whatever was submitted, unless told otherwise.
#[derive(Default)]
pub struct MockNotaryClient {
    /// Transactions submitted, in order.
    pub submitted: Mutex<Vec<Transaction>>,
    /// Force this path to win.
    pub finalize: Option<Path>,
    /// Let the validity bound pass instead.
    pub expire: bool,
    /// Report a FAULT for the winner.
    pub fault: bool,
    /// Fail submission outright?
    pub should_fail: bool,
}

#[async_trait]
impl NotaryClient for MockNotaryClient {
    async fn submit(&self, tx: Transaction) -> Result<SentTransaction, LedgerError> {
        if self.should_fail {
            return Err(LedgerError::Rpc("Mock failure".to_string()));
        }
        let sent = SentTransaction {
            hash: tx.hash(),
            valid_until_block: tx.valid_until_block,
        };
        self.submitted.lock().push(tx);
        Ok(sent)
    }

    async fn wait_any(
        &self,
        main: TxHash,
        fallback: TxHash,
        valid_until_block: u32,
    ) -> Result<ExecutionResult, LedgerError> {
        if self.expire {
            return Err(LedgerError::Expired { valid_until_block });
        }
        let tx_hash = match self.finalize {
            Some(Path::Primary) => main,
            Some(Path::Fallback) => fallback,
            None => self
                .submitted
                .lock()
                .last()
                .map(Transaction::hash)
                .ok_or_else(|| LedgerError::UnexpectedResult("nothing submitted".into()))?,
        };
        Ok(ExecutionResult {
            tx_hash,
            block: 1,
            vm_state: if self.fault { VmState::Fault } else { VmState::Halt },
            exception: self.fault.then(|| "mock fault".to_string()),
        })
    }
}

/// Mock handler recording every finalized mint.
#[derive(Default)]
pub struct MockFinalizationHandler {
    /// Mints handed over, in order.
    pub calls: Mutex<Vec<FinalizedMint>>,
    /// Fail every call?
    pub should_fail: bool,
}

#[async_trait]
impl FinalizationHandler for MockFinalizationHandler {
    async fn on_primary_finalized(&self, mint: &FinalizedMint) -> Result<(), CoSigningError> {
        self.calls.lock().push(mint.clone());
        if self.should_fail {
            return Err(CoSigningError::SideEffect("Mock failure".to_string()));
        }
        Ok(())
    }
}
