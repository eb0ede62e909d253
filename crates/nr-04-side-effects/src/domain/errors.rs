//! # Domain Errors
//!
//! Any of these leaves the on-chain item without an artifact address. None
//! is retried.

use shared_types::{LedgerError, TxHash};
use thiserror::Error;

/// Side-effect pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SideEffectError {
    /// Transport-level fetch failure.
    #[error("fetch {url} failed: {reason}")]
    Fetch {
        /// Resource address
        url: String,
        /// Transport error
        reason: String,
    },

    /// Origin answered with a non-success status.
    #[error("fetch {url} returned status {status}")]
    FetchStatus {
        /// Resource address
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Object store refused the write.
    #[error("store failed: {0}")]
    Store(String),

    /// Link-back transaction could not be sent or awaited.
    #[error("link-back failed: {0}")]
    Link(#[from] LedgerError),

    /// Link-back transaction was included but did not halt.
    #[error("link-back {tx_hash} faulted: {reason}")]
    LinkFaulted {
        /// Link-back transaction
        tx_hash: TxHash,
        /// VM exception, if reported
        reason: String,
    },

    /// Item name cannot name a resource.
    #[error("invalid item name `{0}`")]
    InvalidItemName(String),

    /// Malformed artifact address or identifier.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}
