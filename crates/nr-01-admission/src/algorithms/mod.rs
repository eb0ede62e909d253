//! # Algorithms

pub mod deposit;

pub use deposit::build_deposit_script;
