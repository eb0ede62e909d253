//! Bridges nr-03 finalizations to the nr-04 pipeline.

use async_trait::async_trait;
use nr_03_cosigning::{CoSigningError, FinalizationHandler, FinalizedMint};
use nr_04_side_effects::SideEffectApi;
use std::sync::Arc;
use tracing::info;

/// Runs the side-effect pipeline for every primary finalization.
pub struct SideEffectBridge<E: SideEffectApi> {
    executor: Arc<E>,
}

impl<E: SideEffectApi> SideEffectBridge<E> {
    /// Bridge into `executor`.
    pub fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<E: SideEffectApi> FinalizationHandler for SideEffectBridge<E> {
    async fn on_primary_finalized(&self, mint: &FinalizedMint) -> Result<(), CoSigningError> {
        let artifact = self
            .executor
            .execute(&mint.intent.item_name)
            .await
            .map_err(|e| CoSigningError::SideEffect(e.to_string()))?;
        info!(
            request = %mint.request,
            item = %mint.intent.item_name,
            address = %artifact,
            "[relay] Item linked"
        );
        Ok(())
    }
}
