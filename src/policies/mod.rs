//! Retry policies.
//!
//! This module groups the knobs that control **if/when** a failed load is
//! retried and **how long** a slot waits between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`]   retry budget (`max_retries`) plus backoff curve
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! Config { retry: RetryPolicy, .. }
//!      └─► slot::retry::RetryScheduler uses:
//!           - retry.next_delay(spent) to decide retry/give up
//!           - a cancellable timer to fire the reload
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 3 retries.
//! - `BackoffPolicy::default()` → first=2s, factor=2.0, max=64s, jitter=None.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
