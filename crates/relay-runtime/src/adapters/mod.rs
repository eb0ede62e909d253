//! # Adapters
//!
//! Port implementations connecting the subsystems to each other and to the
//! ledger.

mod finalization;
mod ledger;
mod policy;

pub use finalization::SideEffectBridge;
pub use ledger::{InMemoryLedger, ItemRecord, LedgerConfig, PropertiesReader};
pub use policy::UnmintedItems;
