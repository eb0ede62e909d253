//! # Domain Entities

use super::errors::CoSigningError;
use super::value_objects::{Path, RequestState};
use nr_02_authenticator::MintIntent;
use serde::{Deserialize, Serialize};
use shared_types::{ExecutionResult, TxHash};

/// Lifecycle of one notary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRequest {
    /// Request identity.
    pub hash: TxHash,
    state: RequestState,
    history: Vec<RequestState>,
}

impl TrackedRequest {
    /// Start tracking a freshly observed request.
    pub fn new(hash: TxHash) -> Self {
        Self {
            hash,
            state: RequestState::Received,
            history: vec![RequestState::Received],
        }
    }

    /// Current state.
    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Every state entered, oldest first.
    pub fn history(&self) -> &[RequestState] {
        &self.history
    }

    /// Move to `next`, refusing transitions the state machine forbids.
    pub fn advance(&mut self, next: RequestState) -> Result<(), CoSigningError> {
        if !self.state.can_transition_to(next) {
            return Err(CoSigningError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Record the terminal state for `error`, if the machine allows it.
    pub fn abandon(&mut self, error: &CoSigningError) {
        let terminal = if error.is_rejection() {
            RequestState::Rejected
        } else {
            RequestState::Failed
        };
        if self.state.can_transition_to(terminal) {
            self.state = terminal;
            self.history.push(terminal);
        }
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// One transaction of the pair finalized.
    Finalized(Path),
    /// Refused before signing.
    Rejected(CoSigningError),
    /// Abandoned after signing started.
    Failed(CoSigningError),
}

impl RequestOutcome {
    /// Did the main transaction finalize?
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Finalized(Path::Primary))
    }
}

/// A mint whose main transaction finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedMint {
    /// Request identity.
    pub request: TxHash,
    /// What was minted.
    pub intent: MintIntent,
    /// Execution of the main transaction.
    pub result: ExecutionResult,
}

/// Counters since start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    /// Requests observed entering the pool.
    pub received: u64,
    /// Refused before signing.
    pub rejected: u64,
    /// Finalized on the primary path.
    pub primary: u64,
    /// Finalized on the fallback path.
    pub fallback: u64,
    /// Abandoned after signing.
    pub failed: u64,
    /// Primary finalizations whose side effects failed.
    pub side_effect_failures: u64,
}
