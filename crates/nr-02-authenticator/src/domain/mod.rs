//! # Domain Module
//!
//! Decoded instructions, reconstructed arguments and the reasons a request
//! can be refused.

pub mod config;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use config::AuthenticatorConfig;
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
