//! # Event bus for broadcasting slot and broker events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Slots publish
//! from whatever context they run in (user calls, load tasks, retry timers,
//! relay tasks); the orchestrator owns one listener that forwards everything to
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! Publishers (many):                  Consumer (one):
//!   SlotEngine(interstitial) ──┐
//!   SlotEngine(rewarded)     ──┼───► Bus ───► Orchestrator listener ───► SubscriberSet
//!   SlotEngine(banner)       ──┤  (broadcast)
//!   Orchestrator             ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and may be called while a slot lock is held.
//! - **Bounded capacity**: slow receivers get `RecvError::Lagged(n)` and skip `n` items.
//! - **No persistence**: events sent with no receiver are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
