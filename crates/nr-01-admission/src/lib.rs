//! # NR-01 Admission Controller
//!
//! Maintains the fee credit ("deposit") the notary contract holds on behalf
//! of an account. Assisted transactions draw their network fees from it.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Deposit Flow
//!
//! ```text
//! ensure_deposit(beneficiary)
//!   └─▶ GAS.transfer(relay, Notary, amount, [beneficiary, till])   (signed by the relay)
//!         └─▶ wait for the block ──▶ HALT ? receipt : error
//! ```
//!
//! Deposits only ever add credit, so repeated calls are harmless.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use algorithms::build_deposit_script;
pub use domain::{AdmissionError, DepositConfig, DepositReceipt};
pub use ports::{AdmissionApi, DepositLedger, MockDepositLedger};
pub use service::AdmissionController;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
