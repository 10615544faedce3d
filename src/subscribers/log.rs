//! # LogWriter — events rendered through `tracing`
//!
//! A subscriber that turns every [`Event`] into one structured `tracing`
//! record under the `adbroker::events` target. Lifecycle noise goes to
//! `debug`, failures to `warn`, everything else to `info`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG adbroker::events: load started format="interstitial" attempt=0
//!  WARN adbroker::events: load failed format="interstitial" reason="no fill"
//!  INFO adbroker::events: retry scheduled format="interstitial" attempt=1 delay_ms=2000
//!  INFO adbroker::events: paid format="banner" value_micros=1200 currency="USD"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let format = e.format.map(|f| f.as_label()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        let placement = e.placement.as_deref().unwrap_or("");

        match e.kind {
            EventKind::LoadStarted => {
                tracing::debug!(target: "adbroker::events", format, placement, attempt = e.attempt, "load started");
            }
            EventKind::Loaded => {
                tracing::debug!(target: "adbroker::events", format, placement, "loaded");
            }
            EventKind::LoadFailed => {
                tracing::warn!(target: "adbroker::events", format, placement, reason, "load failed");
            }
            EventKind::LoadDiscarded => {
                tracing::debug!(target: "adbroker::events", format, reason, "stale load discarded");
            }
            EventKind::RetryScheduled => {
                tracing::info!(target: "adbroker::events", format, attempt = e.attempt, delay_ms = e.delay_ms, reason, "retry scheduled");
            }
            EventKind::RetriesExhausted => {
                tracing::warn!(target: "adbroker::events", format, attempt = e.attempt, reason, "retries exhausted");
            }
            EventKind::ShowStarted => {
                tracing::info!(target: "adbroker::events", format, placement, "show started");
            }
            EventKind::ShowRejected => {
                tracing::debug!(target: "adbroker::events", format, reason, "show rejected");
            }
            EventKind::Closed => {
                tracing::info!(target: "adbroker::events", format, "closed");
            }
            EventKind::ShowFailed => {
                tracing::warn!(target: "adbroker::events", format, reason, "show failed");
            }
            EventKind::DestroyDeferred => {
                tracing::debug!(target: "adbroker::events", format, "destroy deferred until close");
            }
            EventKind::Destroyed => {
                tracing::debug!(target: "adbroker::events", format, "destroyed");
            }
            EventKind::VisibilityApplied => {
                tracing::debug!(target: "adbroker::events", format, visibility = reason, "visibility applied");
            }
            EventKind::RewardEarned => {
                if let Some(r) = &e.reward {
                    tracing::info!(target: "adbroker::events", format, kind = %r.kind, amount = r.amount, "reward earned");
                }
            }
            EventKind::Paid => {
                if let Some(v) = &e.revenue {
                    tracing::info!(target: "adbroker::events", format, placement, value_micros = v.value_micros, currency = %v.currency, "paid");
                }
            }
            EventKind::Impression => {
                tracing::debug!(target: "adbroker::events", format, placement, "impression");
            }
            EventKind::Clicked => {
                tracing::debug!(target: "adbroker::events", format, placement, "clicked");
            }
            EventKind::ConsentReady => {
                tracing::info!(target: "adbroker::events", "consent ready");
            }
            EventKind::RemoveAdsChanged => {
                tracing::info!(target: "adbroker::events", remove_ads = reason, "remove-ads changed");
            }
            EventKind::ForegroundIgnored => {
                tracing::debug!(target: "adbroker::events", reason, "foreground ignored");
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "adbroker::events", "shutdown requested");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(target: "adbroker::events", "all slots stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(target: "adbroker::events", stuck = reason, "grace exceeded");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                tracing::warn!(target: "adbroker::events", kind = ?e.kind, reason, "subscriber trouble");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
