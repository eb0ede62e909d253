//! # Shared Crypto
//!
//! secp256k1 key pairs for the relay's own account and helpers that turn a
//! signature into a ledger witness.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Secret key bytes are zeroized when a key pair is dropped

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod ecdsa;
pub mod errors;

pub use context::{LocalSigner, SigningContext};
pub use ecdsa::{invocation_script, signature_from_invocation, Secp256k1KeyPair, Secp256k1Signature};
pub use errors::CryptoError;
