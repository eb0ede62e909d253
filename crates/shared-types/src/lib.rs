//! # Shared Types Crate
//!
//! Ledger primitives shared by all relay subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem boundary
//!   (transactions, signers, notary requests) is defined here.
//! - **Byte order is explicit**: `ScriptHash` stores big-endian bytes (the
//!   form scripts carry) and renders the reversed little-endian hex form used
//!   in configuration and logs.
//! - **No I/O**: this crate is pure data plus hashing.

pub mod entities;
pub mod errors;
pub mod vm;

pub use entities::*;
pub use errors::*;
pub use vm::{
    interop_id, parse_signature_contract, signature_contract, Opcode, Operand, ScriptBuilder,
};
