//! # Event Publisher
//!
//! Fans each event out to the queue of every subscriber whose filter
//! matches it. Subscribers that went away are pruned on the next publish.

use crate::events::{EventFilter, RelayEvent};
use crate::subscriber::{EventSubscriber, Subscription};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`; returns how many subscribers it was queued for.
    async fn publish(&self, event: RelayEvent) -> usize;

    /// Total events published so far.
    fn events_published(&self) -> u64;
}

struct Subscriber {
    filter: EventFilter,
    sender: mpsc::UnboundedSender<RelayEvent>,
}

/// Process-local event bus.
#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: Mutex<Vec<Subscriber>>,
    events_published: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|s| !s.sender.is_closed());
        subscribers.len()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New subscription created");
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(Subscriber {
            filter: filter.clone(),
            sender,
        });
        Subscription::new(receiver, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: RelayEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0;
        self.subscribers.lock().retain(|s| {
            if !s.filter.matches(&event) {
                return !s.sender.is_closed();
            }
            let live = s.sender.send(event.clone()).is_ok();
            if live {
                delivered += 1;
            }
            live
        });
        trace!(topic = ?topic, delivered, "Event published");
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::tests::sample_request_event;
    use crate::events::EventTopic;

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();
        let delivered = bus.publish(sample_request_event()).await;
        assert_eq!(delivered, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_only_matching_subscribers_receive() {
        let bus = InMemoryEventBus::new();

        let _pool = bus.subscribe(EventFilter::all());
        let _blocks = bus.subscribe(EventFilter::topics(vec![EventTopic::Blocks]));

        assert_eq!(bus.publish(sample_request_event()).await, 1);
        assert_eq!(bus.publish(RelayEvent::BlockPersisted { height: 1 }).await, 2);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_dropped_subscription_pruned() {
        let bus = InMemoryEventBus::new();
        let sub = bus.subscribe(EventFilter::all());
        let _kept = bus.subscribe(EventFilter::all());
        drop(sub);

        assert_eq!(bus.publish(RelayEvent::BlockPersisted { height: 1 }).await, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }
}
