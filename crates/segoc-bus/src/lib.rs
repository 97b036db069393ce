// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget event bus between the conversation engine and the
//! dashboard.
//!
//! Publishing never blocks and never fails: with no subscribers the event is
//! dropped, and slow subscribers observe `Lagged` rather than stalling the
//! engine.

pub mod events;

use tokio::sync::broadcast;
use tracing::trace;

pub use events::{BusEvent, Envelope};

/// Default number of undelivered events kept per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event`, returning how many subscribers will see it.
    pub fn publish(&self, event: BusEvent) -> usize {
        let kind = event.kind();
        let session_id = event.session_id().to_string();
        let delivered = self.sender.send(Envelope::new(event)).unwrap_or(0);
        trace!(kind, session_id = %session_id, delivered, "bus event published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
