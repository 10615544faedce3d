//! # Subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! (revenue reporting, debugging overlays, test probes) into the broker. Each
//! subscriber is driven by a dedicated worker fed by a bounded queue owned by
//! the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block slots nor other subscribers.
//! - If a queue overflows, events for that subscriber are **dropped** and a
//!   `SubscriberOverflow` event is published.
//!
//! ## Example
//! ```rust
//! use adbroker::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Revenue;
//!
//! #[async_trait]
//! impl Subscribe for Revenue {
//!     async fn on_event(&self, ev: &Event) {
//!         if let (EventKind::Paid, Some(value)) = (ev.kind, &ev.revenue) {
//!             let _ = value.value_micros;
//!         }
//!     }
//!     fn name(&self) -> &'static str { "revenue" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
