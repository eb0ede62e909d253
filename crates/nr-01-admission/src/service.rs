//! # Admission Controller Service

use crate::algorithms::build_deposit_script;
use crate::domain::{AdmissionError, DepositConfig, DepositReceipt};
use crate::ports::{AdmissionApi, DepositLedger};
use async_trait::async_trait;
use shared_crypto::SigningContext;
use shared_types::ScriptHash;
use std::sync::Arc;
use tracing::{info, warn};

/// Deposits fee credit with the notary contract.
pub struct AdmissionController<L: DepositLedger> {
    ledger: Arc<L>,
    signer: Arc<dyn SigningContext>,
    config: DepositConfig,
}

impl<L: DepositLedger> AdmissionController<L> {
    /// Create a controller paying from `signer`'s account.
    pub fn new(ledger: Arc<L>, signer: Arc<dyn SigningContext>, config: DepositConfig) -> Self {
        Self {
            ledger,
            signer,
            config,
        }
    }

    /// Deposit parameters in use.
    pub fn config(&self) -> &DepositConfig {
        &self.config
    }
}

#[async_trait]
impl<L: DepositLedger> AdmissionApi for AdmissionController<L> {
    async fn ensure_deposit(
        &self,
        beneficiary: ScriptHash,
    ) -> Result<DepositReceipt, AdmissionError> {
        if self.config.amount <= 0 {
            return Err(AdmissionError::InvalidAmount(self.config.amount));
        }

        let script = build_deposit_script(
            &self.signer.account(),
            &beneficiary,
            self.config.amount,
            self.config.till,
        );
        let sent = self.ledger.send(script, self.signer.as_ref()).await?;
        info!(
            beneficiary = %beneficiary,
            tx = %sent.hash,
            amount = self.config.amount,
            "[nr-01] Deposit submitted"
        );

        let result = self.ledger.wait(&sent).await?;
        if !result.is_halt() {
            let reason = result.exception.unwrap_or_default();
            warn!(beneficiary = %beneficiary, tx = %sent.hash, %reason, "[nr-01] Deposit faulted");
            return Err(AdmissionError::Faulted {
                beneficiary,
                tx_hash: sent.hash,
                reason,
            });
        }

        info!(beneficiary = %beneficiary, block = result.block, "[nr-01] Deposit finalized");
        Ok(DepositReceipt {
            beneficiary,
            amount: self.config.amount,
            tx_hash: sent.hash,
            block: result.block,
        })
    }

    async fn balance(&self) -> Result<i64, AdmissionError> {
        Ok(self
            .ledger
            .balance_of(ScriptHash::GAS, self.signer.account())
            .await?)
    }
}
