//! # Authenticator Service
//!
//! Config-driven implementation of [`RequestAuthenticator`].

use crate::algorithms::{decode_script, parse_arguments, parse_trailer};
use crate::domain::value_objects::REQUIRED_SIGNERS;
use crate::domain::{AuthenticatorConfig, RejectionReason, ValidatedCallIntent};
use crate::ports::RequestAuthenticator;
use shared_types::Signer;
use tracing::debug;

/// Validates notary request scripts against one expected call.
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthenticatorConfig,
}

impl Authenticator {
    /// Create an authenticator for `config`.
    pub fn new(config: AuthenticatorConfig) -> Self {
        Self { config }
    }

    /// The call this authenticator accepts.
    pub fn config(&self) -> &AuthenticatorConfig {
        &self.config
    }
}

impl RequestAuthenticator for Authenticator {
    fn validate(
        &self,
        script: &[u8],
        signers: &[Signer],
    ) -> Result<ValidatedCallIntent, RejectionReason> {
        if signers.len() != REQUIRED_SIGNERS {
            return Err(RejectionReason::WrongSignerCount { got: signers.len() });
        }

        let stream = decode_script(script)?;
        let (trailer, prologue) = parse_trailer(stream.as_slice(), &self.config)?;
        let args = parse_arguments(prologue)?;

        debug!(
            "[nr-02] Accepted {}.{} with {} args (flags {})",
            trailer.contract,
            trailer.method,
            args.len(),
            trailer.call_flags
        );

        Ok(ValidatedCallIntent {
            contract: trailer.contract,
            method: trailer.method,
            call_flags: trailer.call_flags,
            args,
        })
    }
}
