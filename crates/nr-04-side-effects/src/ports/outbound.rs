//! # Outbound Ports

use crate::domain::{ContainerId, FetchedResource, ObjectHeader, ObjectId, SideEffectError};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use shared_crypto::SigningContext;
use shared_types::{ExecutionResult, LedgerError, ScriptHash, SentTransaction, TxHash, VmState};

/// External resource source - outbound port.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource named `item_name`.
    async fn fetch(&self, item_name: &str) -> Result<FetchedResource, SideEffectError>;
}

/// Content-addressed object store - outbound port.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `payload` under `header`; returns the new object's id.
    async fn put(&self, header: ObjectHeader, payload: Bytes) -> Result<ObjectId, SideEffectError>;

    /// Read an object back.
    async fn get(
        &self,
        container: &ContainerId,
        object: &ObjectId,
    ) -> Result<Option<Bytes>, SideEffectError>;
}

/// Ordinary single-signer transactions - outbound port.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Wrap `script` in a transaction with `signer` as its only signer,
    /// sign it and submit it.
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError>;

    /// Block until `sent` is included, or its validity bound passes.
    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock fetcher serving the same payload for every item.
pub struct MockResourceFetcher {
    /// Items requested, in order.
    pub fetched: Mutex<Vec<String>>,
    /// Body returned.
    pub payload: Bytes,
    /// Fail every fetch?
    pub should_fail: bool,
}

impl Default for MockResourceFetcher {
    fn default() -> Self {
        Self {
            fetched: Mutex::new(Vec::new()),
            payload: Bytes::from_static(b"GIF89a nyan"),
            should_fail: false,
        }
    }
}

#[async_trait]
impl ResourceFetcher for MockResourceFetcher {
    async fn fetch(&self, item_name: &str) -> Result<FetchedResource, SideEffectError> {
        self.fetched.lock().push(item_name.to_string());
        let url = format!("mock://{item_name}");
        if self.should_fail {
            return Err(SideEffectError::FetchStatus { url, status: 404 });
        }
        Ok(FetchedResource {
            url,
            content_type: Some("image/gif".to_string()),
            payload: self.payload.clone(),
        })
    }
}

/// Mock ledger recording every link-back script.
#[derive(Default)]
pub struct MockLedgerWriter {
    /// Scripts submitted with their sender, in order.
    pub sent: Mutex<Vec<(ScriptHash, Vec<u8>)>>,
    /// Report a FAULT on wait?
    pub fault: bool,
    /// Fail submission outright?
    pub should_fail: bool,
}

#[async_trait]
impl LedgerWriter for MockLedgerWriter {
    async fn send(
        &self,
        script: Vec<u8>,
        signer: &dyn SigningContext,
    ) -> Result<SentTransaction, LedgerError> {
        if self.should_fail {
            return Err(LedgerError::Rpc("Mock failure".to_string()));
        }
        let hash = TxHash::digest(&script);
        self.sent.lock().push((signer.account(), script));
        Ok(SentTransaction {
            hash,
            valid_until_block: 100,
        })
    }

    async fn wait(&self, sent: &SentTransaction) -> Result<ExecutionResult, LedgerError> {
        Ok(ExecutionResult {
            tx_hash: sent.hash,
            block: 2,
            vm_state: if self.fault { VmState::Fault } else { VmState::Halt },
            exception: self.fault.then(|| "mock fault".to_string()),
        })
    }
}
