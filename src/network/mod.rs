//! # Ad network collaborator.
//!
//! The third-party SDK is modelled as two narrow traits:
//! - [`AdNetwork`] issues load requests and yields loaded handles;
//! - [`AdHandle`] is one loaded creative (display / hide / destroy).
//!
//! Callbacks of a handle (close, failed-to-show, paid, impression, click,
//! reward) are reported through the [`AdEventSink`] passed to `load`. The sink
//! only enqueues: a slot never runs inside an SDK callback.
//!
//! ```text
//! SlotEngine ── load(request, sink) ──► AdNetwork ──► Box<dyn AdHandle>
//!     ▲                                                   │
//!     └──── relay task ◄── mpsc ◄── sink.emit(AdEvent) ◄──┘
//! ```

mod payload;
mod sink;

pub use payload::{
    AdEvent, AdValue, BannerLayout, BannerPosition, BannerSize, Collapsible, LoadRequest, Precision,
    Reward,
};
pub use sink::AdEventSink;

pub(crate) use sink::{RelayMessage, relay_channel};

use async_trait::async_trait;

use crate::error::LoadError;

/// A loaded, displayable creative. Owned by exactly one slot.
///
/// `destroy` is called exactly once per handle and never while a display is
/// in flight.
pub trait AdHandle: Send + Sync + 'static {
    /// Whether the creative can still be presented.
    fn is_ready(&self) -> bool {
        true
    }

    /// Starts the presentation. Full-screen formats later report
    /// [`AdEvent::Closed`] or [`AdEvent::FailedToShow`]; banners become visible.
    fn display(&self);

    /// Hides a banner. Full-screen formats ignore it.
    fn hide(&self) {}

    /// Releases native resources.
    fn destroy(&self);
}

/// Network collaborator used by every slot.
#[async_trait]
pub trait AdNetwork: Send + Sync + 'static {
    /// Requests a creative. Events of the returned handle must be reported on `events`.
    async fn load(
        &self,
        request: LoadRequest,
        events: AdEventSink,
    ) -> Result<Box<dyn AdHandle>, LoadError>;
}
