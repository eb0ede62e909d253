//! # Relay Events
//!
//! Everything the ledger adapter can tell the rest of the relay.

use serde::{Deserialize, Serialize};
use shared_types::{ExecutionResult, MempoolEventKind, NotaryRequest};

/// A notary pool change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotaryRequestEvent {
    /// Whether the request entered or left the pool.
    pub kind: MempoolEventKind,
    /// The request itself.
    pub request: NotaryRequest,
}

/// All events that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelayEvent {
    /// A notary request entered or left the pending pool.
    NotaryRequest(NotaryRequestEvent),

    /// A new block was persisted.
    BlockPersisted {
        /// Height of the block.
        height: u32,
    },

    /// A transaction was included and executed.
    TransactionExecuted(ExecutionResult),
}

impl RelayEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::NotaryRequest(_) => EventTopic::NotaryPool,
            Self::BlockPersisted { .. } => EventTopic::Blocks,
            Self::TransactionExecuted(_) => EventTopic::Executions,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Notary pool additions and removals.
    NotaryPool,
    /// Block persistence.
    Blocks,
    /// Transaction execution results.
    Executions,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
