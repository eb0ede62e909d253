//! # NR-02 Request Authenticator
//!
//! Decides whether a pending assisted transaction encodes exactly the one
//! contract call the relay is willing to underwrite.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (domain / algorithms / ports / service)
//!
//! ## Pipeline
//!
//! ```text
//! script bytes ──decode──▶ InstructionStream ──trailer──▶ (contract, method, flags)
//!                                       │
//!                                       └──prologue──▶ Vec<Argument>
//! ```
//!
//! Nothing here performs I/O or keeps state between calls: `validate` is a
//! pure function of the script and signer list.
//!
//! ## Module Structure
//!
//! ```text
//! nr-02-authenticator/
//! ├── domain/          # Instruction, Argument, CallFlags, intents, errors
//! ├── algorithms/      # decoder, integer literals, trailer, prologue grammar
//! ├── ports/           # RequestAuthenticator
//! └── service.rs       # Authenticator (config-driven port implementation)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use algorithms::{decode_script, parse_arguments, parse_trailer, CallTrailer};
pub use domain::{
    Argument, ArgumentError, AuthenticatorConfig, CallFlags, DecodeError, Instruction,
    InstructionStream, IntegerLiteral, MintIntent, RejectionReason, ValidatedCallIntent,
    MIN_ITEM_NAME_LEN,
};
pub use ports::RequestAuthenticator;
pub use service::Authenticator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
