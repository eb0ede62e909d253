//! # Domain Module
//!
//! Request lifecycle, co-signer accounts, admissibility policy, in-flight
//! item registry and errors.

pub mod accounts;
pub mod config;
pub mod entities;
pub mod errors;
pub mod policy;
pub mod registry;
pub mod value_objects;

pub use accounts::{SigningAccount, WitnessOnlyAccount};
pub use config::CoSigningConfig;
pub use entities::*;
pub use errors::CoSigningError;
pub use policy::{AdmissionPolicy, AlwaysAdmit};
pub use registry::{InFlightGuard, InFlightRegistry};
pub use value_objects::{Path, RequestState};
