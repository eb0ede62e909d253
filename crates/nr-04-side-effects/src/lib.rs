//! # NR-04 Side-Effect Executor
//!
//! Off-chain work for a mint whose main transaction finalized: fetch the
//! item's resource, persist it in a content-addressed store, and record the
//! resulting address on the contract with a second, ordinary transaction.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pipeline
//!
//! ```text
//! execute(item)
//!   ├─▶ ResourceFetcher::fetch   GET <base>/<item>
//!   ├─▶ ObjectStore::put         ──▶ <container>/<object>
//!   └─▶ LedgerWriter::send/wait  contract.setAddress(item, address)
//! ```
//!
//! No step is retried.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{HttpResourceFetcher, InMemoryObjectStore};
pub use algorithms::{build_link_script, check_item_name};
pub use domain::{
    ContainerId, FetchedResource, ObjectHeader, ObjectId, SideEffectConfig, SideEffectError,
    StoredArtifact,
};
pub use ports::{
    LedgerWriter, MockLedgerWriter, MockResourceFetcher, ObjectStore, ResourceFetcher,
    SideEffectApi,
};
pub use service::SideEffectExecutor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
