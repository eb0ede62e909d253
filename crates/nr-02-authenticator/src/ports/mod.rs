//! # Ports
//!
//! The authenticator has no outbound dependencies.

pub mod inbound;

pub use inbound::RequestAuthenticator;
