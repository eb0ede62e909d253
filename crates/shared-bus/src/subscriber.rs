//! # Event Subscriber
//!
//! Receiving side of the bus. A subscription only ever sees events its
//! filter matched at publish time.

use crate::events::{EventFilter, RelayEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was dropped and the queue is drained.
    #[error("Event bus closed")]
    Closed,
}

/// Anything events can be subscribed from.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A subscription handle for receiving events.
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<RelayEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<RelayEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Next matching event.
    ///
    /// Returns `None` once the bus is dropped and everything queued before
    /// that has been received.
    pub async fn recv(&mut self) -> Option<RelayEvent> {
        self.receiver.recv().await
    }

    /// Next matching event if one is already queued.
    pub fn try_recv(&mut self) -> Result<Option<RelayEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
