//! # Core Ledger Entities
//!
//! Primitives the relay observes on and submits to the ledger.
//!
//! ## Clusters
//!
//! - **Identity**: `ScriptHash`, `PublicKey`, `TxHash`
//! - **Authorization**: `Signer`, `WitnessScope`, `Witness`
//! - **Transactions**: `Transaction`, `TxAttribute`, `NotaryRequest`
//! - **Execution**: `ExecutionResult`, `VmState`, `ContractParam`

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DeserializeFromStr, SerializeDisplay};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// One GAS expressed in its smallest unit.
pub const GAS_FACTOR: i64 = 100_000_000;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Version byte prefixed to a script hash in its base58check address.
pub const ADDRESS_VERSION: u8 = 0x35;

/// A 20-byte account or contract identifier.
///
/// Stored in the big-endian order scripts carry it in. `Display` and
/// `FromStr` use the reversed little-endian hex form.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct ScriptHash([u8; 20]);

impl ScriptHash {
    /// The notary system contract; always the first signer of a fallback.
    pub const NOTARY: ScriptHash = ScriptHash([
        0x3b, 0xec, 0x35, 0x31, 0x11, 0x9b, 0xba, 0xd7, 0x6d, 0xd0, 0x44, 0x92, 0x0b, 0x0d, 0xe6,
        0xc3, 0x19, 0x4f, 0xe1, 0xc1,
    ]);

    /// The native GAS token contract.
    pub const GAS: ScriptHash = ScriptHash([
        0xcf, 0x76, 0xe2, 0x8b, 0xd0, 0x06, 0x2c, 0x4a, 0x47, 0x8e, 0xe3, 0x55, 0x61, 0x01, 0x13,
        0x19, 0xf3, 0xcf, 0xa4, 0xd2,
    ]);

    /// Wrap big-endian bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build from a big-endian slice of exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 20] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Hash of a verification script.
    #[must_use]
    pub fn from_script(script: &[u8]) -> Self {
        let digest = Sha256::digest(script);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[..20]);
        Self(out)
    }

    /// Big-endian bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Little-endian hex, as shown to operators.
    #[must_use]
    pub fn to_le_hex(&self) -> String {
        let mut le = self.0;
        le.reverse();
        hex::encode(le)
    }

    /// Base58check address (`N...`).
    #[must_use]
    pub fn to_address(&self) -> String {
        bs58::encode(self.0)
            .with_check_version(ADDRESS_VERSION)
            .into_string()
    }

    /// Parse a base58check address.
    pub fn from_address(address: &str) -> Result<Self, TypeError> {
        let decoded = bs58::decode(address)
            .with_check(Some(ADDRESS_VERSION))
            .into_vec()
            .map_err(|e| TypeError::InvalidAddress(e.to_string()))?;
        match decoded.split_first() {
            Some((&ADDRESS_VERSION, hash)) => Self::from_slice(hash),
            _ => Err(TypeError::InvalidAddress(address.to_string())),
        }
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_le_hex())
    }
}

impl fmt::Debug for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptHash({})", self.to_le_hex())
    }
}

impl FromStr for ScriptHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        bytes.reverse();
        Self::from_slice(&bytes)
    }
}

/// A compressed 33-byte public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Parse a compressed point encoding (prefix 0x02 or 0x03).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; 33] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: 33,
            actual: bytes.len(),
        })?;
        match arr[0] {
            0x02 | 0x03 => Ok(Self(arr)),
            other => Err(TypeError::InvalidKeyPrefix(other)),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Account hash of the standard signature contract for this key.
    #[must_use]
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&crate::vm::signature_contract(self))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// A 32-byte transaction (or request) hash.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct TxHash([u8; 32]);

impl TxHash {
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `data`.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for TxHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

// =============================================================================
// CLUSTER B: AUTHORIZATION
// =============================================================================

/// Where a signer's witness is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WitnessScope {
    /// Only pays fees; authorizes nothing.
    #[default]
    None,
    /// Valid for the entry script only.
    CalledByEntry,
    /// Valid everywhere.
    Global,
}

impl WitnessScope {
    fn to_byte(self) -> u8 {
        match self {
            WitnessScope::None => 0x00,
            WitnessScope::CalledByEntry => 0x01,
            WitnessScope::Global => 0x80,
        }
    }
}

/// One account that must authorize a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub account: ScriptHash,
    pub scope: WitnessScope,
}

impl Signer {
    #[must_use]
    pub fn new(account: ScriptHash, scope: WitnessScope) -> Self {
        Self { account, scope }
    }
}

/// Invocation (signatures) plus verification script for one signer.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Witness {
    #[serde_as(as = "Hex")]
    pub invocation: Vec<u8>,
    #[serde_as(as = "Hex")]
    pub verification: Vec<u8>,
}

impl Witness {
    /// Account this witness speaks for.
    #[must_use]
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.verification)
    }

    /// True when no signature has been placed yet.
    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        self.invocation.is_empty()
    }
}

// =============================================================================
// CLUSTER C: TRANSACTIONS
// =============================================================================

/// Transaction attributes the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxAttribute {
    /// Marks an assisted transaction; `n_keys` is the number of co-signers.
    NotaryAssisted { n_keys: u8 },
    /// The holder conflicts with (excludes) the named transaction.
    Conflicts(TxHash),
    /// Not valid before this block height.
    NotValidBefore(u32),
}

/// An unsigned-or-signed ledger transaction.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u32,
    pub system_fee: i64,
    pub network_fee: i64,
    pub valid_until_block: u32,
    pub signers: Vec<Signer>,
    pub attributes: Vec<TxAttribute>,
    #[serde_as(as = "Hex")]
    pub script: Vec<u8>,
    /// Parallel to `signers`.
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Deterministic encoding of everything except witnesses.
    #[must_use]
    pub fn unsigned_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.script.len());
        out.push(0); // version
        out.extend_from_slice(&self.nonce.to_le_bytes());
        out.extend_from_slice(&self.system_fee.to_le_bytes());
        out.extend_from_slice(&self.network_fee.to_le_bytes());
        out.extend_from_slice(&self.valid_until_block.to_le_bytes());

        out.push(self.signers.len() as u8);
        for signer in &self.signers {
            out.extend_from_slice(signer.account.as_bytes());
            out.push(signer.scope.to_byte());
        }

        out.push(self.attributes.len() as u8);
        for attr in &self.attributes {
            match attr {
                TxAttribute::NotaryAssisted { n_keys } => {
                    out.push(0x22);
                    out.push(*n_keys);
                }
                TxAttribute::Conflicts(hash) => {
                    out.push(0x21);
                    out.extend_from_slice(hash.as_bytes());
                }
                TxAttribute::NotValidBefore(height) => {
                    out.push(0x20);
                    out.extend_from_slice(&height.to_le_bytes());
                }
            }
        }

        out.extend_from_slice(&(self.script.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.script);
        out
    }

    /// Transaction hash; independent of witnesses.
    #[must_use]
    pub fn hash(&self) -> TxHash {
        TxHash::digest(&self.unsigned_bytes())
    }

    /// Bytes a signer signs: network magic followed by the hash.
    #[must_use]
    pub fn signing_message(&self, network_magic: u32) -> Vec<u8> {
        let mut msg = Vec::with_capacity(36);
        msg.extend_from_slice(&network_magic.to_le_bytes());
        msg.extend_from_slice(self.hash().as_bytes());
        msg
    }

    /// First signer pays fees.
    #[must_use]
    pub fn sender(&self) -> Option<ScriptHash> {
        self.signers.first().map(|s| s.account)
    }

    /// Position of `account` in the signer list.
    #[must_use]
    pub fn signer_index(&self, account: &ScriptHash) -> Option<usize> {
        self.signers.iter().position(|s| &s.account == account)
    }

    /// Hash named by a `Conflicts` attribute, if any.
    #[must_use]
    pub fn conflicts_with(&self) -> Option<TxHash> {
        self.attributes.iter().find_map(|a| match a {
            TxAttribute::Conflicts(h) => Some(*h),
            _ => None,
        })
    }
}

/// A pending co-signing request: a main transaction plus its fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryRequest {
    pub main: Transaction,
    pub fallback: Transaction,
    /// Witness of the request's submitter (the fallback's second signer).
    pub witness: Witness,
}

impl NotaryRequest {
    /// Stable identity of the request.
    #[must_use]
    pub fn hash(&self) -> TxHash {
        let mut data = Vec::with_capacity(64);
        data.extend_from_slice(self.main.hash().as_bytes());
        data.extend_from_slice(self.fallback.hash().as_bytes());
        TxHash::digest(&data)
    }

    /// Account that submitted the request.
    #[must_use]
    pub fn submitter(&self) -> ScriptHash {
        self.witness.script_hash()
    }
}

/// Whether a request entered or left the pending pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MempoolEventKind {
    Added,
    Removed,
}

// =============================================================================
// CLUSTER D: EXECUTION
// =============================================================================

/// A submitted transaction the caller may wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransaction {
    pub hash: TxHash,
    /// Last block in which it may still be included.
    pub valid_until_block: u32,
}

/// Terminal VM state of an executed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmState {
    Halt,
    Fault,
}

/// Outcome of a finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tx_hash: TxHash,
    pub block: u32,
    pub vm_state: VmState,
    pub exception: Option<String>,
}

impl ExecutionResult {
    #[must_use]
    pub fn is_halt(&self) -> bool {
        self.vm_state == VmState::Halt
    }
}

/// A typed argument for an outbound contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractParam {
    Hash160(ScriptHash),
    Bytes(Vec<u8>),
    String(String),
    Integer(i64),
    Bool(bool),
    Null,
    Array(Vec<ContractParam>),
}
