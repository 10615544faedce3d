//! # Events emitted by slots and the orchestrator.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Slot lifecycle**: load, retry, show, close, destroy of one placement
//! - **Ad relays**: revenue, impression, click and reward callbacks of a handle
//! - **Broker events**: consent, remove-ads, host lifecycle, shutdown, subscribers
//!
//! The [`Event`] struct carries the metadata: format, placement id, attempt,
//! delay, reason, revenue and reward payloads.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use adbroker::{Event, EventKind, FormatKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_format(FormatKind::Interstitial)
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay_ms, Some(4_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::formats::FormatKind;
use crate::network::{AdValue, Reward};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Slot lifecycle ===
    /// A load request was issued to the network.
    ///
    /// Sets: `format`, `placement`, `attempt` (0 for an explicit load, retry number otherwise).
    LoadStarted,

    /// A load completed and the handle is stored; the slot is `Ready`.
    ///
    /// Sets: `format`, `placement`.
    Loaded,

    /// A load failed.
    ///
    /// Sets: `format`, `placement`, `reason`.
    LoadFailed,

    /// A load completed for a superseded request; its handle (if any) was destroyed.
    ///
    /// Sets: `format`, `reason`.
    LoadDiscarded,

    /// A retry timer was armed.
    ///
    /// Sets: `format`, `attempt` (retry number, 1-based), `delay_ms`, `reason` (last failure).
    RetryScheduled,

    /// The retry budget is spent; the slot stays `Empty` until the next explicit load.
    ///
    /// Sets: `format`, `attempt` (retries spent), `reason` (last failure).
    RetriesExhausted,

    /// A handle started presenting.
    ///
    /// Sets: `format`, `placement`.
    ShowStarted,

    /// A `show()` call was refused synchronously.
    ///
    /// Sets: `format`, `reason` (error label).
    ShowRejected,

    /// A presentation was dismissed by the user.
    ///
    /// Sets: `format`.
    Closed,

    /// A presentation failed after it started.
    ///
    /// Sets: `format`, `reason`.
    ShowFailed,

    /// `destroy()` arrived while showing; it will complete when the presentation ends.
    ///
    /// Sets: `format`.
    DestroyDeferred,

    /// The slot released its handle and returned to `Empty`.
    ///
    /// Sets: `format`.
    Destroyed,

    /// Banner visibility was applied to a loaded handle.
    ///
    /// Sets: `format`, `reason` (`"visible"` / `"hidden"`).
    VisibilityApplied,

    // === Ad relays ===
    /// The user earned the reward of a rewarded format.
    ///
    /// Sets: `format`, `reward`.
    RewardEarned,

    /// The handle reported revenue.
    ///
    /// Sets: `format`, `placement`, `revenue`.
    Paid,

    /// The handle recorded an impression.
    ///
    /// Sets: `format`, `placement`.
    Impression,

    /// The handle recorded a click.
    ///
    /// Sets: `format`, `placement`.
    Clicked,

    // === Broker events ===
    /// The consent gate reported readiness; initial loads follow.
    ConsentReady,

    /// The remove-ads entitlement changed.
    ///
    /// Sets: `reason` (`"enabled"` / `"disabled"`).
    RemoveAdsChanged,

    /// A foreground transition was ignored (cold start, auto-show disabled...).
    ///
    /// Sets: `reason`.
    ForegroundIgnored,

    /// Shutdown requested.
    ShutdownRequested,

    /// Every slot finished its deferred destroy within the grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some slots were still presenting.
    ///
    /// Sets: `reason` (stuck formats).
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (subscriber name and panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (subscriber name and `full`/`closed`).
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot the event belongs to, if any.
    pub format: Option<FormatKind>,
    /// Placement id of that slot.
    pub placement: Option<Arc<str>>,
    /// Attempt or retry number.
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, labels, overflow details...).
    pub reason: Option<Arc<str>>,
    /// Revenue payload of a `Paid` event.
    pub revenue: Option<AdValue>,
    /// Reward payload of a `RewardEarned` event.
    pub reward: Option<Reward>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            format: None,
            placement: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            revenue: None,
            reward: None,
        }
    }

    /// Attaches the slot format.
    #[inline]
    pub fn with_format(mut self, format: FormatKind) -> Self {
        self.format = Some(format);
        self
    }

    /// Attaches a placement id.
    #[inline]
    pub fn with_placement(mut self, placement: impl Into<Arc<str>>) -> Self {
        self.placement = Some(placement.into());
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a revenue payload.
    #[inline]
    pub fn with_revenue(mut self, value: AdValue) -> Self {
        self.revenue = Some(value);
        self
    }

    /// Attaches a reward payload.
    #[inline]
    pub fn with_reward(mut self, reward: Reward) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Returns the delay as a [`Duration`], if set.
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
