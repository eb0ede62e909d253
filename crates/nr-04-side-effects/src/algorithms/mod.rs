//! # Algorithms
//!
//! - `link`: the link-back call script
//! - `item`: item names usable as resource paths

pub mod item;
pub mod link;

pub use item::check_item_name;
pub use link::build_link_script;
