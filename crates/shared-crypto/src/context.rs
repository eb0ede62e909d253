//! # Signing Context
//!
//! The relay's signing authority, passed explicitly to every component that
//! needs to sign. Nothing in the workspace reaches for a global key.

use crate::Secp256k1KeyPair;
use shared_types::{PublicKey, ScriptHash, Transaction, Witness};

/// An account able to produce witnesses on one network.
pub trait SigningContext: Send + Sync {
    /// Account the witnesses are for.
    fn account(&self) -> ScriptHash;

    /// Public key behind `account`.
    fn public_key(&self) -> PublicKey;

    /// Network magic mixed into every signed message.
    fn network_magic(&self) -> u32;

    /// Witness for `tx` by `account`.
    fn sign(&self, tx: &Transaction) -> Witness;
}

/// In-process key pair bound to a network.
#[derive(Debug)]
pub struct LocalSigner {
    key: Secp256k1KeyPair,
    network_magic: u32,
}

impl LocalSigner {
    /// Bind `key` to `network_magic`.
    pub fn new(key: Secp256k1KeyPair, network_magic: u32) -> Self {
        Self { key, network_magic }
    }
}

impl SigningContext for LocalSigner {
    fn account(&self) -> ScriptHash {
        self.key.script_hash()
    }

    fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    fn network_magic(&self) -> u32 {
        self.network_magic
    }

    fn sign(&self, tx: &Transaction) -> Witness {
        self.key.sign_transaction(tx, self.network_magic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature_from_invocation;

    #[test]
    fn test_local_signer_binds_magic() {
        let signer = LocalSigner::new(Secp256k1KeyPair::from_bytes([7u8; 32]).unwrap(), 42);
        let tx = Transaction {
            nonce: 1,
            ..Default::default()
        };

        let witness = signer.sign(&tx);
        assert_eq!(witness.script_hash(), signer.account());

        let sig = signature_from_invocation(&witness.invocation).unwrap();
        assert!(sig.verify(&signer.public_key(), &tx.signing_message(42)).is_ok());
        assert!(sig.verify(&signer.public_key(), &tx.signing_message(43)).is_err());
    }
}
