//! # Co-Signer Accounts
//!
//! The relay signs with a [`SigningAccount`]. The counterparty is a
//! [`WitnessOnlyAccount`]: its public key is known, its secret never is, so
//! the type has no way to sign.

use shared_crypto::SigningContext;
use shared_types::{
    parse_signature_contract, signature_contract, PublicKey, ScriptHash, Signer, Transaction,
    Witness, WitnessScope,
};
use std::fmt;
use std::sync::Arc;

/// An account the relay holds the key for.
#[derive(Clone)]
pub struct SigningAccount {
    context: Arc<dyn SigningContext>,
    scope: WitnessScope,
}

impl SigningAccount {
    /// Sign through `context` under `scope`.
    pub fn new(context: Arc<dyn SigningContext>, scope: WitnessScope) -> Self {
        Self { context, scope }
    }

    /// Account hash.
    pub fn account(&self) -> ScriptHash {
        self.context.account()
    }

    /// Signer entry this account occupies.
    pub fn signer(&self) -> Signer {
        Signer::new(self.account(), self.scope)
    }

    /// Witness for `tx`.
    pub fn sign(&self, tx: &Transaction) -> Witness {
        self.context.sign(tx)
    }

    /// Underlying signing context.
    pub fn context(&self) -> &Arc<dyn SigningContext> {
        &self.context
    }
}

impl fmt::Debug for SigningAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningAccount")
            .field("account", &self.account())
            .field("scope", &self.scope)
            .finish()
    }
}

/// An account known only by its public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessOnlyAccount {
    key: PublicKey,
    scope: WitnessScope,
}

impl WitnessOnlyAccount {
    /// Account for `key` under `scope`.
    pub fn new(key: PublicKey, scope: WitnessScope) -> Self {
        Self { key, scope }
    }

    /// Recover the key from a standard signature contract.
    pub fn from_verification_script(script: &[u8], scope: WitnessScope) -> Option<Self> {
        parse_signature_contract(script).map(|key| Self::new(key, scope))
    }

    /// Public key.
    pub fn public_key(&self) -> PublicKey {
        self.key
    }

    /// Account hash.
    pub fn account(&self) -> ScriptHash {
        self.key.script_hash()
    }

    /// Signer entry this account occupies.
    pub fn signer(&self) -> Signer {
        Signer::new(self.account(), self.scope)
    }

    /// Empty invocation with this account's verification script; the
    /// owner's signature is merged in by the notary subsystem.
    pub fn placeholder(&self) -> Witness {
        Witness {
            invocation: Vec::new(),
            verification: signature_contract(&self.key),
        }
    }
}
