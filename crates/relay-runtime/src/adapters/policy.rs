//! Admission policy backed by ledger state.

use super::ledger::InMemoryLedger;
use nr_02_authenticator::MintIntent;
use nr_03_cosigning::AdmissionPolicy;
use std::sync::Arc;
use tracing::info;

/// Admits a mint only while its item name is still free on the ledger.
///
/// A refused request is pushed to its fallback instead of being left to
/// fault on-chain.
pub struct UnmintedItems {
    ledger: Arc<InMemoryLedger>,
}

impl UnmintedItems {
    /// Policy reading `ledger`.
    pub fn new(ledger: Arc<InMemoryLedger>) -> Self {
        Self { ledger }
    }
}

impl AdmissionPolicy for UnmintedItems {
    fn admit(&self, intent: &MintIntent) -> bool {
        let taken = self.ledger.item_exists(&intent.item_name);
        if taken {
            info!(item = %intent.item_name, "[relay] Item already minted, refusing");
        }
        !taken
    }
}
