//! # Algorithms
//!
//! Pure functions over script bytes: decoding, the call trailer and the
//! argument prologue.

pub mod decoder;
pub mod prologue;
pub mod trailer;

pub use decoder::decode_script;
pub use prologue::{parse_arguments, MAX_NESTING_DEPTH};
pub use trailer::{parse_trailer, CallTrailer, TRAILER_LEN};
