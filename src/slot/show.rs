//! # Callbacks of a `show()` call.
//!
//! [`ShowCallbacks`] bundles the one-shot callbacks a caller attaches to a
//! presentation. Exactly one of `on_success` / `on_failure` runs per call;
//! `on_reward` runs at most once, before the outcome, and only for rewarded
//! formats. Callbacks always run outside the slot lock, so they may call back
//! into the broker.
//!
//! ## Example
//! ```rust
//! use adbroker::ShowCallbacks;
//!
//! let callbacks = ShowCallbacks::new()
//!     .on_success(|| println!("closed"))
//!     .on_failure(|err| eprintln!("not shown: {err}"))
//!     .on_reward(|reward| println!("earned {} {}", reward.amount, reward.kind));
//! # drop(callbacks);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use tokio::sync::oneshot;

use crate::error::ShowError;
use crate::network::Reward;

type SuccessFn = Box<dyn FnOnce() + Send + 'static>;
type FailureFn = Box<dyn FnOnce(ShowError) + Send + 'static>;
pub(crate) type RewardFn = Box<dyn FnOnce(Reward) + Send + 'static>;

/// Outcome delivered by [`ShowCallbacks::channel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShowOutcome {
    /// Reward earned during the presentation, if any.
    pub reward: Option<Reward>,
}

/// One-shot callbacks of a presentation.
#[derive(Default)]
pub struct ShowCallbacks {
    success: Option<SuccessFn>,
    failure: Option<FailureFn>,
    reward: Option<RewardFn>,
}

impl ShowCallbacks {
    /// Callbacks that do nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the user dismisses the presentation.
    pub fn on_success(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Called when the show is refused or the presentation fails.
    pub fn on_failure(mut self, f: impl FnOnce(ShowError) + Send + 'static) -> Self {
        self.failure = Some(Box::new(f));
        self
    }

    /// Called when the user earns the reward.
    pub fn on_reward(mut self, f: impl FnOnce(Reward) + Send + 'static) -> Self {
        self.reward = Some(Box::new(f));
        self
    }

    /// Callbacks that resolve a oneshot channel with the outcome.
    ///
    /// The receiver yields `Ok` on close (with the reward, if one was earned)
    /// and `Err` on refusal or presentation failure.
    pub fn channel() -> (Self, oneshot::Receiver<Result<ShowOutcome, ShowError>>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new((Some(tx), None::<Reward>)));

        let on_reward = {
            let slot = slot.clone();
            move |reward: Reward| slot.lock().1 = Some(reward)
        };
        let on_success = {
            let slot = slot.clone();
            move || {
                let mut guard = slot.lock();
                let (tx, reward) = &mut *guard;
                if let Some(tx) = tx.take() {
                    let _ = tx.send(Ok(ShowOutcome { reward: reward.take() }));
                }
            }
        };
        let on_failure = move |err: ShowError| {
            if let Some(tx) = slot.lock().0.take() {
                let _ = tx.send(Err(err));
            }
        };

        let callbacks = Self::new()
            .on_success(on_success)
            .on_failure(on_failure)
            .on_reward(on_reward);
        (callbacks, rx)
    }

    pub(crate) fn succeed(self) {
        if let Some(f) = self.success {
            f();
        }
    }

    pub(crate) fn fail(self, err: ShowError) {
        if let Some(f) = self.failure {
            f(err);
        }
    }

    /// Detaches the reward callback; later calls return `None`.
    pub(crate) fn take_reward(&mut self) -> Option<RewardFn> {
        self.reward.take()
    }
}

impl fmt::Debug for ShowCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShowCallbacks")
            .field("on_success", &self.success.is_some())
            .field("on_failure", &self.failure.is_some())
            .field("on_reward", &self.reward.is_some())
            .finish()
    }
}
