//! # Admission Policy
//!
//! Business rules deciding whether a validated mint is co-signed on its
//! primary path. A request the policy refuses is pushed to its fallback.

use nr_02_authenticator::MintIntent;

/// Decides whether a validated mint may proceed.
pub trait AdmissionPolicy: Send + Sync {
    /// `true` to co-sign the main transaction, `false` for the fallback.
    fn admit(&self, intent: &MintIntent) -> bool;
}

/// Admits every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAdmit;

impl AdmissionPolicy for AlwaysAdmit {
    fn admit(&self, _intent: &MintIntent) -> bool {
        true
    }
}

impl<F> AdmissionPolicy for F
where
    F: Fn(&MintIntent) -> bool + Send + Sync,
{
    fn admit(&self, intent: &MintIntent) -> bool {
        self(intent)
    }
}
