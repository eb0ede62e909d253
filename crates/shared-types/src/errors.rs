//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while parsing ledger primitives from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Input was not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Input had the wrong byte length.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Compressed public key prefix was not 0x02/0x03.
    #[error("Invalid public key prefix: {0:#04x}")]
    InvalidKeyPrefix(u8),

    /// Base58 address failed to decode or carried another version byte.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors reported by ledger-facing ports (RPC, submission, finalization).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Transport-level failure talking to the node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node refused the transaction or request.
    #[error("Submission rejected: {0}")]
    Rejected(String),

    /// Neither transaction finalized before the validity bound.
    #[error("Not finalized before block {valid_until_block}")]
    Expired { valid_until_block: u32 },

    /// Transaction finalized but its execution faulted.
    #[error("Execution faulted: {0}")]
    Faulted(String),

    /// A contract call returned an unexpected result shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}
