// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process publish/subscribe bus for ledger changes.
//!
//! The reward ledger publishes after every successful approval; projections
//! (community impact, any future live view) subscribe with a scoped
//! lifetime. Dropping a receiver releases the subscription, so a consumer
//! that goes away cannot leak one.

use tokio::sync::broadcast;

/// Events emitted by the reward ledger.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    /// A profile's point balance changed.
    PointsChanged { user_id: String, points: u32 },
    /// A community-wide aggregate (total waste removed) changed.
    AggregateChanged,
}

/// Broadcast bus shared through `AppState`.
///
/// Publishing never blocks; slow subscribers that fall behind the channel
/// capacity observe a `Lagged` error and resubscribe from the current
/// position, which is fine for recompute-on-notify consumers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LedgerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: LedgerEvent) {
        // Err means no live subscribers, which is not a failure
        if self.tx.send(event).is_err() {
            tracing::debug!("Ledger event dropped: no subscribers");
        }
    }

    /// Open a new subscription. Drop the receiver to release it.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscriptions (for tests and diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
