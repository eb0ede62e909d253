//! Key and signature errors.

use thiserror::Error;

/// Failures handling the relay key or checking a witness signature.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Secret key has the wrong size.
    #[error("secret key must be {expected} bytes, got {actual}")]
    KeyLength {
        /// Required size
        expected: usize,
        /// Size supplied
        actual: usize,
    },

    /// Secret key text is not hex.
    #[error("secret key is not hex: {0}")]
    KeyEncoding(String),

    /// Secret scalar is zero or not below the curve order.
    #[error("secret key is out of range")]
    SecretOutOfRange,

    /// Bytes are not a compressed secp256k1 point.
    #[error("not a compressed secp256k1 public key")]
    InvalidPublicKey,

    /// Signature bytes are not a valid `r || s` pair.
    #[error("malformed signature")]
    MalformedSignature,

    /// Signature does not match the key and message.
    #[error("signature does not verify")]
    BadSignature,
}
