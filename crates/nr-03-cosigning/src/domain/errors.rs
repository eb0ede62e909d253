//! # Domain Errors
//!
//! Everything that can end a request other than finalization. None of these
//! reach a caller; the orchestrator logs them and drops the request.

use super::value_objects::RequestState;
use nr_02_authenticator::RejectionReason;
use shared_types::{LedgerError, ScriptHash, TxHash};
use thiserror::Error;

/// Co-signing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoSigningError {
    /// Request was submitted by the relay itself.
    #[error("request originated from the relay account")]
    SelfOriginated,

    /// Main script is not the accepted call.
    #[error("authentication failed: {0}")]
    Authentication(#[from] RejectionReason),

    /// A signer slot holds the wrong account or scope.
    #[error("signer {index} does not have the expected role")]
    WrongSignerRole {
        /// Position in the main transaction's signer list
        index: usize,
    },

    /// Counterparty verification script is not a single-key contract.
    #[error("counterparty witness is not a standard signature contract")]
    UnknownCounterpartyKey,

    /// Counterparty key does not hash to the counterparty signer.
    #[error("counterparty key hashes to {derived}, signer is {expected}")]
    CounterpartyMismatch {
        /// Account in the signer list
        expected: ScriptHash,
        /// Account derived from the witness key
        derived: ScriptHash,
    },

    /// Fallback transaction is not the bare conflicting RET it must be.
    #[error("malformed fallback: {0}")]
    FallbackMalformed(String),

    /// Another request for the same item is in flight.
    #[error("item `{0}` is already being processed")]
    ItemBusy(String),

    /// Submission or resolution wait failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The finalized transaction did not halt.
    #[error("{tx_hash} faulted: {reason}")]
    Faulted {
        /// Transaction that was included
        tx_hash: TxHash,
        /// VM exception, if reported
        reason: String,
    },

    /// Resolution named neither transaction of the pair.
    #[error("resolution reported unrelated transaction {0}")]
    UnrelatedResolution(TxHash),

    /// Lifecycle step out of order.
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        /// Current state
        from: RequestState,
        /// Requested state
        to: RequestState,
    },

    /// Post-finalization work failed.
    #[error("side effect failed: {0}")]
    SideEffect(String),
}

impl CoSigningError {
    /// True for errors raised before anything was signed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SelfOriginated
                | Self::Authentication(_)
                | Self::WrongSignerRole { .. }
                | Self::UnknownCounterpartyKey
                | Self::CounterpartyMismatch { .. }
                | Self::FallbackMalformed(_)
                | Self::ItemBusy(_)
        )
    }
}
