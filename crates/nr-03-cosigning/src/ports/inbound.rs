//! # Inbound Ports

use crate::domain::{OrchestratorStats, RequestOutcome};
use async_trait::async_trait;
use shared_bus::NotaryRequestEvent;

/// Co-signing API - inbound port.
#[async_trait]
pub trait CoSigningApi: Send + Sync {
    /// Process one notary pool event to completion. `None` for events the
    /// relay ignores (removals).
    async fn handle_request(&self, event: &NotaryRequestEvent) -> Option<RequestOutcome>;

    /// Counters since start.
    fn stats(&self) -> OrchestratorStats;
}
