//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: every `SlotEngine`, the `Orchestrator`, and `SubscriberSet`
//!   workers (overflow/panic).
//! - **Consumers**: the orchestrator's listener (fans out to `SubscriberSet`)
//!   and anything holding a receiver from [`Orchestrator::subscribe`](crate::Orchestrator::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
