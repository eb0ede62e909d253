//! # Domain Errors

use shared_types::{LedgerError, ScriptHash, TxHash};
use thiserror::Error;

/// Admission errors; always surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The ledger could not be reached or refused the transfer.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The transfer was included but did not halt.
    #[error("Deposit for {beneficiary} faulted in {tx_hash}: {reason}")]
    Faulted {
        /// Account the deposit was for
        beneficiary: ScriptHash,
        /// Transfer transaction
        tx_hash: TxHash,
        /// VM exception, if reported
        reason: String,
    },

    /// Configured amount is not positive.
    #[error("Invalid deposit amount: {0}")]
    InvalidAmount(i64),
}
