//! # Adapters
//!
//! Implementations of the outbound ports that need no ledger access.

mod http_fetcher;
mod memory_store;

pub use http_fetcher::HttpResourceFetcher;
pub use memory_store::InMemoryObjectStore;
