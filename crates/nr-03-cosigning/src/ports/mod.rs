//! # Ports
//!
//! - **Inbound** (`CoSigningApi`): request handling driven by the event loop
//! - **Outbound** (`NotaryClient`, `FinalizationHandler`): the notary
//!   subsystem, and whoever acts on a primary finalization

pub mod inbound;
pub mod outbound;

pub use inbound::CoSigningApi;
pub use outbound::{FinalizationHandler, MockFinalizationHandler, MockNotaryClient, NotaryClient};
