//! # Ports
//!
//! - **Inbound** (`AdmissionApi`): what the HTTP surface and runtime call
//! - **Outbound** (`DepositLedger`): what the controller needs from the ledger

pub mod inbound;
pub mod outbound;

pub use inbound::AdmissionApi;
pub use outbound::{DepositLedger, MockDepositLedger};
