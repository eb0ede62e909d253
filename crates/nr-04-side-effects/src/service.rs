//! # Side-Effect Executor Service
//!
//! Runs after a mint's main transaction finalized:
//!
//! 1. fetch `<base URL><item name>`
//! 2. store the bytes in the configured container
//! 3. send `contract.setAddress(item name, "<container>/<object>")` signed by
//!    the relay alone, and wait for it
//!
//! Between the mint and step 3 finalizing, the item exists on-chain without
//! an address. A failure at any step leaves it that way.

use crate::algorithms::{build_link_script, check_item_name};
use crate::domain::{ObjectHeader, SideEffectConfig, SideEffectError, StoredArtifact};
use crate::ports::{LedgerWriter, ObjectStore, ResourceFetcher, SideEffectApi};
use async_trait::async_trait;
use shared_crypto::SigningContext;
use shared_types::ScriptHash;
use std::sync::Arc;
use tracing::{info, warn};

/// Side-Effect Executor.
pub struct SideEffectExecutor<F, S, L>
where
    F: ResourceFetcher,
    S: ObjectStore,
    L: LedgerWriter,
{
    config: SideEffectConfig,
    contract: ScriptHash,
    fetcher: Arc<F>,
    store: Arc<S>,
    ledger: Arc<L>,
    signer: Arc<dyn SigningContext>,
}

impl<F, S, L> SideEffectExecutor<F, S, L>
where
    F: ResourceFetcher,
    S: ObjectStore,
    L: LedgerWriter,
{
    /// Executor linking artifacts on `contract`.
    pub fn new(
        config: SideEffectConfig,
        contract: ScriptHash,
        fetcher: Arc<F>,
        store: Arc<S>,
        ledger: Arc<L>,
        signer: Arc<dyn SigningContext>,
    ) -> Self {
        Self {
            config,
            contract,
            fetcher,
            store,
            ledger,
            signer,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SideEffectConfig {
        &self.config
    }

    async fn link(&self, item_name: &str, artifact: &StoredArtifact) -> Result<(), SideEffectError> {
        let script = build_link_script(&self.contract, &self.config.link_method, item_name, artifact);
        let sent = self.ledger.send(script, self.signer.as_ref()).await?;
        let result = self.ledger.wait(&sent).await?;
        if !result.is_halt() {
            return Err(SideEffectError::LinkFaulted {
                tx_hash: sent.hash,
                reason: result.exception.unwrap_or_default(),
            });
        }
        info!(
            item = %item_name,
            address = %artifact,
            tx = %sent.hash,
            block = result.block,
            "[nr-04] Linked"
        );
        Ok(())
    }
}

#[async_trait]
impl<F, S, L> SideEffectApi for SideEffectExecutor<F, S, L>
where
    F: ResourceFetcher,
    S: ObjectStore,
    L: LedgerWriter,
{
    async fn execute(&self, item_name: &str) -> Result<StoredArtifact, SideEffectError> {
        check_item_name(item_name)?;

        let resource = self.fetcher.fetch(item_name).await.map_err(|e| {
            warn!(item = %item_name, error = %e, "[nr-04] Fetch failed");
            e
        })?;
        info!(
            item = %item_name,
            url = %resource.url,
            bytes = resource.payload.len(),
            "[nr-04] Fetched"
        );

        let header = ObjectHeader::for_item(self.config.container, self.signer.account(), item_name);
        let object = self.store.put(header, resource.payload).await.map_err(|e| {
            warn!(item = %item_name, error = %e, "[nr-04] Store failed");
            e
        })?;
        let artifact = StoredArtifact {
            container: self.config.container,
            object,
        };
        info!(item = %item_name, address = %artifact, "[nr-04] Stored");

        self.link(item_name, &artifact).await.map_err(|e| {
            warn!(item = %item_name, address = %artifact, error = %e, "[nr-04] Link-back failed");
            e
        })?;
        Ok(artifact)
    }
}
