//! # Inbound Ports

use crate::domain::{SideEffectError, StoredArtifact};
use async_trait::async_trait;

/// Side-effect API - inbound port.
#[async_trait]
pub trait SideEffectApi: Send + Sync {
    /// Fetch, store and link the resource named `item_name`.
    async fn execute(&self, item_name: &str) -> Result<StoredArtifact, SideEffectError>;
}
