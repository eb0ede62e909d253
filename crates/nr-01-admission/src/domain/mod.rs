//! # Domain Module
//!
//! Deposit configuration, receipts and errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
