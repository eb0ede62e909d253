//! # Notary Relay Runtime
//!
//! Wires the four relay subsystems together and exposes them for the
//! binary and for end-to-end tests.
//!
//! ```text
//! ledger events ──▶ nr-03 orchestrator ──▶ nr-02 authenticator
//!                        │
//!                        ├──▶ notary submit / wait
//!                        └──▶ nr-04 side effects (primary only)
//!
//! HTTP ──▶ nr-01 admission (balance, deposits)
//!      └─▶ contract properties
//! ```
//!
//! ## Modules
//!
//! - `config` - TOML configuration with environment overrides
//! - `logging` - `tracing-subscriber` setup
//! - `adapters` - ledger adapter, admission policy, side-effect bridge
//! - `api` - HTTP surface
//! - `runtime` - construction, startup and shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, RelayConfig};
pub use runtime::{RelayExecutor, RelayOrchestrator, RelayRuntime};
