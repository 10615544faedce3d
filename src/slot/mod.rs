//! Per-placement lifecycle engine.
//!
//! ## Contents
//! - [`SlotEngine`] generic state machine (load / show / destroy / retry)
//! - [`SlotStatus`], [`SlotSnapshot`], [`DestroyOutcome`] observable state
//! - [`ShowCallbacks`], [`ShowOutcome`] callbacks of one presentation
//! - `RetryScheduler` single cancellable retry timer of a slot
//! - `SlotContext` broker wiring shared by every slot

mod context;
mod engine;
mod retry;
mod show;
mod state;

pub(crate) use context::SlotContext;
pub use engine::SlotEngine;
pub use show::{ShowCallbacks, ShowOutcome};
pub use state::{DestroyOutcome, SlotSnapshot, SlotStatus};
