//! # Algorithms
//!
//! - `screening`: structural checks on a request before and after
//!   authentication
//! - `cosign`: witness assembly for the chosen transaction

pub mod cosign;
pub mod screening;

pub use cosign::{cosign, notary_placeholder};
pub use screening::{check_origin, check_structure};
