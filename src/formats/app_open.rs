//! # App-open format.
//!
//! Full-screen ad shown when the app returns to the foreground. On top of
//! the one-shot cycle it adds:
//! - an expiry: a loaded handle lives `Config::app_open_ttl` (4h by default);
//! - a cooldown: `show()` is refused until `Config::app_open_cooldown` has
//!   elapsed since the last dismissed presentation;
//! - [`show_if_available`](SlotEngine::show_if_available), which reloads a
//!   stale or missing handle instead of waiting for the next explicit load.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::{AdFormat, FormatKind, FullScreenFormat};
use crate::config::Config;
use crate::error::ShowError;
use crate::slot::{ShowCallbacks, SlotEngine, SlotStatus};

/// App-open format state.
#[derive(Debug, Default)]
pub struct AppOpen {
    last_shown: Mutex<Option<Instant>>,
}

impl AppOpen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdFormat for AppOpen {
    const KIND: FormatKind = FormatKind::AppOpen;

    fn time_to_live(&self, cfg: &Config) -> Option<Duration> {
        Some(cfg.app_open_ttl).filter(|ttl| !ttl.is_zero())
    }

    fn admit_show(&self, cfg: &Config, now: Instant) -> Result<(), ShowError> {
        let Some(last) = *self.last_shown.lock() else {
            return Ok(());
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < cfg.app_open_cooldown {
            return Err(ShowError::Cooldown {
                remaining: cfg.app_open_cooldown - elapsed,
            });
        }
        Ok(())
    }

    fn on_show_finished(&self, now: Instant, closed: bool) {
        if closed {
            *self.last_shown.lock() = Some(now);
        }
    }
}

impl FullScreenFormat for AppOpen {}

/// App-open slot.
pub type AppOpenSlot = SlotEngine<AppOpen>;

impl SlotEngine<AppOpen> {
    /// Shows the loaded ad if one is available.
    ///
    /// When the show is refused because the handle is missing, expired or not
    /// displayable, a fresh load is started (unless one is already in flight)
    /// and the refusal is still reported.
    pub fn show_if_available(&self, callbacks: ShowCallbacks) -> Result<(), ShowError> {
        let result = self.show(callbacks);
        if let Err(ShowError::NotReady | ShowError::Expired) = &result {
            let kicked = match self.status() {
                SlotStatus::Ready => self.reload(),
                SlotStatus::Empty => self.load(),
                SlotStatus::Loading | SlotStatus::Showing => Ok(()),
            };
            if let Err(rejected) = kicked {
                tracing::debug!(reason = rejected.as_label(), "app-open refresh skipped");
            }
        }
        result
    }

    /// When the last presentation was dismissed.
    pub fn last_shown(&self) -> Option<Instant> {
        *self.format().last_shown.lock()
    }

    /// Time left before the cooldown admits another presentation.
    pub fn cooldown_remaining(&self) -> Duration {
        match self.format().admit_show(&self.config(), Instant::now()) {
            Err(ShowError::Cooldown { remaining }) => remaining,
            _ => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::testing::{FakeNetwork, Harness};
    use tokio::time;

    fn slot(h: &Harness, net: &std::sync::Arc<FakeNetwork>) -> AppOpenSlot {
        SlotEngine::new(AppOpen::new(), "ao-1", net.clone(), h.ctx.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_handle_is_unavailable_but_held() {
        let mut h = Harness::new(Config::default());
        let net = FakeNetwork::new();
        let slot = slot(&h, &net);
        slot.load().unwrap();
        h.next(EventKind::Loaded).await;

        let snap = slot.snapshot();
        assert!(snap.expires_at.is_some());
        assert!(slot.is_available());

        time::sleep(Duration::from_secs(4 * 60 * 60)).await;
        assert!(!slot.is_available());
        assert!(slot.snapshot().has_handle);

        assert_eq!(slot.show(ShowCallbacks::new()), Err(ShowError::Expired));
        assert_eq!(slot.status(), SlotStatus::Ready);
        assert_eq!(net.last_handle().destroys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_if_available_refreshes_expired_handle() {
        let mut h = Harness::new(Config::default());
        let net = FakeNetwork::new();
        let slot = slot(&h, &net);
        slot.load().unwrap();
        h.next(EventKind::Loaded).await;
        let stale = net.last_handle();

        time::sleep(Duration::from_secs(5 * 60 * 60)).await;
        assert_eq!(
            slot.show_if_available(ShowCallbacks::new()),
            Err(ShowError::Expired)
        );
        assert_eq!(stale.destroys(), 1);

        h.next(EventKind::Loaded).await;
        assert!(slot.is_available());
        assert_eq!(slot.show_if_available(ShowCallbacks::new()), Ok(()));
        assert_eq!(net.last_handle().displays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_if_available_loads_empty_slot() {
        let mut h = Harness::new(Config::default());
        let net = FakeNetwork::new();
        let slot = slot(&h, &net);

        assert_eq!(
            slot.show_if_available(ShowCallbacks::new()),
            Err(ShowError::NotReady)
        );
        assert_eq!(slot.status(), SlotStatus::Loading);
        h.next(EventKind::Loaded).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_after_close() {
        let mut h = Harness::new(Config::default());
        let net = FakeNetwork::new();
        let slot = slot(&h, &net);
        slot.load().unwrap();
        h.next(EventKind::Loaded).await;

        slot.show(ShowCallbacks::new()).unwrap();
        net.last_handle().sink.closed();
        h.next(EventKind::Closed).await;
        h.next(EventKind::Loaded).await;
        assert!(slot.last_shown().is_some());

        match slot.show(ShowCallbacks::new()) {
            Err(ShowError::Cooldown { remaining }) => {
                assert!(remaining <= Duration::from_secs(30));
                assert!(remaining > Duration::ZERO);
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert!(slot.cooldown_remaining() > Duration::ZERO);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(slot.cooldown_remaining(), Duration::ZERO);
        assert_eq!(slot.show(ShowCallbacks::new()), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_presentation_does_not_start_cooldown() {
        let mut h = Harness::new(Config::default());
        let net = FakeNetwork::new();
        let slot = slot(&h, &net);
        slot.load().unwrap();
        h.next(EventKind::Loaded).await;

        slot.show(ShowCallbacks::new()).unwrap();
        net.last_handle().sink.failed_to_show("no activity");
        h.next(EventKind::ShowFailed).await;
        assert_eq!(slot.last_shown(), None);
    }
}
