//! Observable state of a slot.

use std::time::Duration;

use tokio::time::Instant;

use crate::formats::FormatKind;

/// Lifecycle status of a slot.
///
/// ```text
/// Empty ──load──► Loading ──ok──► Ready ──show──► Showing ──close/fail──► Loading
///   ▲                │                                 │
///   └────err─────────┘                                 └─(destroy pending)─► Empty
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotStatus {
    /// No handle and no request in flight.
    #[default]
    Empty,
    /// A load request is in flight.
    Loading,
    /// A handle is loaded and waiting to be shown.
    Ready,
    /// A handle is being presented.
    Showing,
}

impl SlotStatus {
    /// Short stable label (snake_case).
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotStatus::Empty => "empty",
            SlotStatus::Loading => "loading",
            SlotStatus::Ready => "ready",
            SlotStatus::Showing => "showing",
        }
    }

    /// A load or a presentation is in progress.
    pub fn is_busy(&self) -> bool {
        matches!(self, SlotStatus::Loading | SlotStatus::Showing)
    }
}

/// Point-in-time copy of a slot's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub format: FormatKind,
    pub status: SlotStatus,
    /// Automatic retries spent since the last successful load.
    pub retry_count: u32,
    pub is_showing: bool,
    /// `destroy()` arrived during a presentation and waits for it to end.
    pub destroy_pending: bool,
    pub has_handle: bool,
    /// Expiry of the loaded handle, for formats with a time-to-live.
    pub expires_at: Option<Instant>,
    /// Delay of the armed retry timer, if any.
    pub retry_pending: Option<Duration>,
}

/// Result of a `destroy()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// The handle (if any) was released and the slot is `Empty`.
    Destroyed,
    /// A presentation is in progress; the destroy completes when it ends.
    Deferred,
}
