//! # ECDSA Signatures (secp256k1)
//!
//! Key pairs for accounts the relay controls and the witness encoding the
//! ledger expects: an invocation script pushing the 64-byte signature and
//! the standard single-key verification script.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces
//! - Constant-time operations

use crate::CryptoError;
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use shared_types::{signature_contract, Opcode, PublicKey, ScriptHash, Transaction, Witness};
use zeroize::Zeroize;

/// ECDSA signature (64 bytes, r||s format).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Create from bytes (64 bytes).
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Verify against a compressed public key.
    pub fn verify(&self, key: &PublicKey, message: &[u8]) -> Result<(), CryptoError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(key.as_bytes())
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = Signature::from_slice(&self.0).map_err(|_| CryptoError::MalformedSignature)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::BadSignature)
    }
}

/// Invocation script carrying one signature: `PUSHDATA1 64 <sig>`.
pub fn invocation_script(signature: &Secp256k1Signature) -> Vec<u8> {
    let mut script = Vec::with_capacity(66);
    script.push(Opcode::PushData1 as u8);
    script.push(64);
    script.extend_from_slice(signature.as_bytes());
    script
}

/// Inverse of [`invocation_script`].
pub fn signature_from_invocation(script: &[u8]) -> Option<Secp256k1Signature> {
    if script.len() != 66 || script[0] != Opcode::PushData1 as u8 || script[1] != 64 {
        return None;
    }
    let mut bytes = [0u8; 64];
    bytes.copy_from_slice(&script[2..]);
    Some(Secp256k1Signature(bytes))
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl Secp256k1KeyPair {
    fn from_signing_key(signing_key: SigningKey) -> Result<Self, CryptoError> {
        let point = signing_key.verifying_key().to_encoded_point(true);
        let public_key =
            PublicKey::from_slice(point.as_bytes()).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// Generate random keypair.
    pub fn generate() -> Self {
        loop {
            let signing_key = SigningKey::random(&mut rand::thread_rng());
            if let Ok(pair) = Self::from_signing_key(signing_key) {
                return pair;
            }
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::SecretOutOfRange)?;
        Self::from_signing_key(signing_key)
    }

    /// Create from a hex-encoded 32-byte secret.
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        let mut raw =
            hex::decode(secret.trim()).map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
        let result = <[u8; 32]>::try_from(raw.as_slice())
            .map_err(|_| CryptoError::KeyLength {
                expected: 32,
                actual: raw.len(),
            })
            .and_then(Self::from_bytes);
        raw.zeroize();
        result
    }

    /// Compressed public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Standard verification script for this key.
    pub fn verification_script(&self) -> Vec<u8> {
        signature_contract(&self.public_key)
    }

    /// Account hash of this key.
    pub fn script_hash(&self) -> ScriptHash {
        self.public_key.script_hash()
    }

    /// Sign a message (deterministic RFC 6979).
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let sig: Signature = self.signing_key.sign(message);
        Secp256k1Signature(sig.to_bytes().into())
    }

    /// Produce this account's witness for `tx` on network `magic`.
    pub fn sign_transaction(&self, tx: &Transaction, magic: u32) -> Witness {
        let signature = self.sign(&tx.signing_message(magic));
        Witness {
            invocation: invocation_script(&signature),
            verification: self.verification_script(),
        }
    }

    /// Get secret key bytes (for serialization).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}
