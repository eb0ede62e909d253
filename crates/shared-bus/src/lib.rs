//! # Shared Bus - Ledger Event Fan-Out
//!
//! Carries what the relay observes on the ledger (notary pool changes,
//! persisted blocks, executed transactions) to every subsystem that cares.
//!
//! ```text
//! ┌──────────────┐    publish()     ┌──────────────┐   subscribe()  ┌──────────────┐
//! │ Ledger       │ ───────────────▶ │  Event Bus   │ ─────────────▶ │ Orchestrator │
//! │ adapter      │                  │ (per-sub     │                │ / waiters    │
//! └──────────────┘                  │  queues)     │                └──────────────┘
//!                                   └──────────────┘
//! ```
//!
//! Every subscriber owns an unbounded queue and the filter is applied when
//! publishing. Each matching event reaches each live subscriber exactly once,
//! in publish order, however far behind that subscriber is.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, NotaryRequestEvent, RelayEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};
