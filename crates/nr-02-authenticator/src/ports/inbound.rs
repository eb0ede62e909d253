//! # Inbound Ports
//!
//! What the authenticator offers the orchestrator.

use crate::domain::{RejectionReason, ValidatedCallIntent};
use shared_types::Signer;

/// Request authentication - inbound port.
///
/// Implementations must be pure: the same input always yields the same
/// result.
pub trait RequestAuthenticator: Send + Sync {
    /// Accept `script` as the one call the relay underwrites, or refuse it.
    fn validate(
        &self,
        script: &[u8],
        signers: &[Signer],
    ) -> Result<ValidatedCallIntent, RejectionReason>;
}
