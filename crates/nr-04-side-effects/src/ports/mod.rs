//! # Ports
//!
//! - **Inbound** (`SideEffectApi`): run the pipeline for one item
//! - **Outbound** (`ResourceFetcher`, `ObjectStore`, `LedgerWriter`)

pub mod inbound;
pub mod outbound;

pub use inbound::SideEffectApi;
pub use outbound::{
    LedgerWriter, MockLedgerWriter, MockResourceFetcher, ObjectStore, ResourceFetcher,
};
