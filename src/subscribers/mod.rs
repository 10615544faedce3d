//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ```text
//!   SlotEngine ── publish(Event) ──► Bus ──► Orchestrator listener ──► SubscriberSet
//!                                                                        │
//!                                                   ┌────────────┬───────┴─────┐
//!                                                   ▼            ▼             ▼
//!                                               LogWriter    Revenue       Custom
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
