//! # NR-03 Co-Signing Orchestrator
//!
//! Turns a counterparty's pending notary request into a finalized
//! transaction: screen it, authenticate the main script, decide which of the
//! pair to co-sign, sign, submit, and wait for the network to resolve it.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Request Flow
//!
//! ```text
//! NotaryRequest ─▶ origin check ─▶ nr-02 validate ─▶ structure check
//!                                                        │
//!         ┌──────────── AdmissionPolicy::admit ◀─────────┘
//!         ▼
//!   main (admit) / fallback (refuse) ─▶ cosign ─▶ NotaryClient::submit
//!                                                        │
//!                      NotaryClient::wait_any ◀──────────┘
//!                              │
//!              main won ───────┴─────── fallback won
//!                 │                          │
//!   FinalizationHandler::on_primary_finalized   done
//! ```
//!
//! ## Co-Signer Set
//!
//! | Slot | Account | Scope | Capability |
//! |------|---------|-------|------------|
//! | 0 | relay | None | [`SigningAccount`] |
//! | 1 | counterparty | Global | [`WitnessOnlyAccount`] |
//! | 2 | Notary | None | placeholder |
//!
//! An item name is held in the [`InFlightRegistry`] from path choice until
//! side effects finish; a concurrent request for the same item is rejected.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use algorithms::{check_origin, check_structure, cosign, notary_placeholder};
pub use domain::{
    AdmissionPolicy, AlwaysAdmit, CoSigningConfig, CoSigningError, FinalizedMint, InFlightGuard,
    InFlightRegistry, OrchestratorStats, Path, RequestOutcome, RequestState, SigningAccount,
    TrackedRequest, WitnessOnlyAccount,
};
pub use ports::{
    CoSigningApi, FinalizationHandler, MockFinalizationHandler, MockNotaryClient, NotaryClient,
};
pub use service::CoSigningOrchestrator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
