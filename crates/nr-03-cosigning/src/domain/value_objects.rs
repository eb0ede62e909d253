//! # Domain Value Objects
//!
//! Resolution paths and the request state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transaction of a notary request is (to be) finalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Path {
    /// The main transaction carrying the call.
    Primary,
    /// The fallback transaction; the call never happens.
    Fallback,
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Primary => f.write_str("primary"),
            Path::Fallback => f.write_str("fallback"),
        }
    }
}

/// Request state machine.
///
/// ```text
/// Received ─▶ Authenticated ─▶ PathChosen ─▶ Signed ─▶ Submitted ─▶ Finalized
///     │             │               │           │           │
///     └─ Rejected ◀─┘               └───────────┴───────────┴─▶ Failed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Observed in the notary pool.
    #[default]
    Received,
    /// Main script validated.
    Authenticated,
    /// Policy decided which transaction to co-sign.
    PathChosen(Path),
    /// Witness set assembled for the chosen transaction.
    Signed(Path),
    /// Handed to the notary subsystem.
    Submitted(Path),
    /// One of the pair entered a block. Carries the path that won, which
    /// need not be the one chosen.
    Finalized(Path),
    /// Refused before anything was signed.
    Rejected,
    /// Gave up after signing started.
    Failed,
}

impl RequestState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        match (self, next) {
            (Self::Received, Self::Authenticated) => true,
            (Self::Received, Self::Rejected) => true,
            (Self::Authenticated, Self::PathChosen(_)) => true,
            (Self::Authenticated, Self::Rejected) => true, // item busy
            (Self::PathChosen(a), Self::Signed(b)) => *a == b,
            (Self::Signed(a), Self::Submitted(b)) => *a == b,
            (Self::Submitted(_), Self::Finalized(_)) => true,
            (Self::PathChosen(_) | Self::Signed(_) | Self::Submitted(_), Self::Failed) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized(_) | Self::Rejected | Self::Failed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Received => f.write_str("received"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::PathChosen(p) => write!(f, "path-chosen({p})"),
            Self::Signed(p) => write!(f, "signed({p})"),
            Self::Submitted(p) => write!(f, "submitted({p})"),
            Self::Finalized(p) => write!(f, "finalized({p})"),
            Self::Rejected => f.write_str("rejected"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
