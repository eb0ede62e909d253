//! # Domain Module
//!
//! Store addresses, fetched resources, configuration and errors.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::SideEffectConfig;
pub use entities::*;
pub use errors::SideEffectError;
