//! # Orchestrator: owns the slots, gates them, and shuts them down.
//!
//! The [`Orchestrator`] owns one slot per enabled format, the event bus and
//! the subscriber fan-out. It holds no ad state of its own: every decision is
//! made by the slots, the orchestrator only feeds them consent, the remove-ads
//! entitlement, and host lifecycle transitions.
//!
//! ## Wiring
//! ```text
//! ConsentGate::ready() ──► consent watch = true ──► ConsentReady ──► load() on every slot
//!
//! set_remove_ads(on)   ──► config watch ──► destroy() interstitial / app-open / banner
//! set_remove_ads(off)  ──► config watch ──► load()    interstitial / app-open / banner
//!
//! on_app_state(Foreground)
//!     ├─ cold start not complete ─► ForegroundIgnored
//!     ├─ auto-show off           ─► ForegroundIgnored
//!     └─ app_open.show_if_available()
//!
//! Slots ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! ## Shutdown
//! ```text
//! shutdown()
//!   ├─► publish ShutdownRequested
//!   ├─► work token cancelled   → retry timers and in-flight loads stop
//!   ├─► slot.shutdown() each   → handles destroyed (deferred while showing)
//!   └─► wait up to shutdown_grace for deferred destroys:
//!          ├─ all settled → AllStoppedWithin, relays and listener stopped
//!          └─ timeout     → GraceExceeded (stuck formats), relays kept alive
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::{BoxFuture, join_all};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::consent::ConsentGate;
use super::lifecycle::{AppState, ForegroundOutcome};
use crate::config::Config;
use crate::error::{BrokerError, LoadRejected, ShowError};
use crate::events::{Bus, Event, EventKind};
use crate::formats::{
    AdFormat, AppOpenSlot, BannerSlot, FormatKind, InterstitialSlot, RewardedInterstitialSlot,
    RewardedSlot,
};
use crate::slot::{DestroyOutcome, ShowCallbacks, SlotEngine, SlotSnapshot};
use crate::subscribers::SubscriberSet;

/// Format-independent view of a slot, for broker-wide operations.
trait ManagedSlot: Send + Sync {
    fn kind(&self) -> FormatKind;
    fn load(&self) -> Result<(), LoadRejected>;
    fn destroy(&self) -> DestroyOutcome;
    fn shutdown(&self) -> DestroyOutcome;
    fn cancel_deferred_destroy(&self) -> bool;
    fn settled(&self) -> BoxFuture<'static, ()>;
    fn snapshot(&self) -> SlotSnapshot;
}

impl<F: AdFormat> ManagedSlot for SlotEngine<F> {
    fn kind(&self) -> FormatKind {
        F::KIND
    }

    fn load(&self) -> Result<(), LoadRejected> {
        SlotEngine::load(self)
    }

    fn destroy(&self) -> DestroyOutcome {
        SlotEngine::destroy(self)
    }

    fn shutdown(&self) -> DestroyOutcome {
        SlotEngine::shutdown(self)
    }

    fn cancel_deferred_destroy(&self) -> bool {
        SlotEngine::cancel_deferred_destroy(self)
    }

    fn settled(&self) -> BoxFuture<'static, ()> {
        let slot = self.clone();
        Box::pin(async move { slot.wait_settled().await })
    }

    fn snapshot(&self) -> SlotSnapshot {
        SlotEngine::snapshot(self)
    }
}

/// Slots of the enabled formats.
pub(super) struct Slots {
    pub interstitial: Option<InterstitialSlot>,
    pub rewarded: Option<RewardedSlot>,
    pub rewarded_interstitial: Option<RewardedInterstitialSlot>,
    pub app_open: Option<AppOpenSlot>,
    pub banner: Option<BannerSlot>,
}

/// Owns every slot and wires consent, remove-ads and host lifecycle into them.
pub struct Orchestrator {
    config_tx: watch::Sender<Arc<Config>>,
    consent_tx: watch::Sender<bool>,
    bus: Bus,
    slots: Slots,
    rt: Handle,
    /// Cancels retry timers and in-flight loads.
    work: CancellationToken,
    /// Stops relay tasks and the subscriber listener.
    root: CancellationToken,
    cold_start_done: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

pub(super) struct Parts {
    pub config_tx: watch::Sender<Arc<Config>>,
    pub consent_tx: watch::Sender<bool>,
    pub bus: Bus,
    pub subs: SubscriberSet,
    pub slots: Slots,
    pub rt: Handle,
    pub work: CancellationToken,
    pub root: CancellationToken,
}

impl Orchestrator {
    pub(super) fn new_internal(parts: Parts) -> Self {
        let listener = subscriber_listener(&parts.rt, &parts.bus, parts.subs, parts.root.clone());
        Self {
            config_tx: parts.config_tx,
            consent_tx: parts.consent_tx,
            bus: parts.bus,
            slots: parts.slots,
            rt: parts.rt,
            work: parts.work,
            root: parts.root,
            cold_start_done: AtomicBool::new(false),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Waits for `consent` in the background, then loads every enabled slot.
    ///
    /// A gate that is already ready is handled synchronously.
    pub fn start(self: &Arc<Self>, consent: Arc<dyn ConsentGate>) {
        if consent.can_request_ads() {
            self.on_consent_ready();
            return;
        }
        let weak = Arc::downgrade(self);
        let work = self.work.clone();
        self.rt.spawn(async move {
            tokio::select! {
                biased;
                _ = work.cancelled() => {}
                _ = consent.ready() => {
                    if let Some(this) = weak.upgrade() {
                        this.on_consent_ready();
                    }
                }
            }
        });
    }

    fn on_consent_ready(&self) {
        if self.work.is_cancelled() || self.consent_tx.send_replace(true) {
            return;
        }
        self.bus.publish(Event::new(EventKind::ConsentReady));
        self.load_all();
    }

    /// Issues `load()` on every enabled slot; refusals are logged and skipped.
    pub fn load_all(&self) {
        for slot in self.slots() {
            if let Err(rejected) = slot.load() {
                tracing::debug!(format = %slot.kind(), reason = rejected.as_label(), "initial load skipped");
            }
        }
    }

    /// Updates the remove-ads entitlement.
    ///
    /// Enabling destroys every suppressed slot (deferred for one that is
    /// showing); disabling reloads them once consent is ready. A slot still
    /// showing when remove-ads is lifted keeps its handle until the close and
    /// then reloads as usual.
    pub fn set_remove_ads(&self, enabled: bool) {
        let changed = self.config_tx.send_if_modified(|cfg| {
            if cfg.remove_ads == enabled {
                return false;
            }
            Arc::make_mut(cfg).remove_ads = enabled;
            true
        });
        if !changed {
            return;
        }
        let state = if enabled { "enabled" } else { "disabled" };
        self.bus
            .publish(Event::new(EventKind::RemoveAdsChanged).with_reason(state));

        for slot in self.slots().filter(|s| s.kind().suppressed_by_remove_ads()) {
            if enabled {
                slot.destroy();
            } else if slot.cancel_deferred_destroy() {
                tracing::debug!(format = %slot.kind(), "deferred destroy withdrawn, reload follows close");
            } else if let Err(rejected) = slot.load() {
                tracing::debug!(format = %slot.kind(), reason = rejected.as_label(), "reload after remove-ads skipped");
            }
        }
    }

    /// Turns the automatic app-open presentation on foreground on or off.
    pub fn set_auto_show_app_open(&self, enabled: bool) {
        self.config_tx.send_if_modified(|cfg| {
            if cfg.auto_show_app_open == enabled {
                return false;
            }
            Arc::make_mut(cfg).auto_show_app_open = enabled;
            true
        });
    }

    /// Marks the end of the cold start; later foreground transitions may show app-open ads.
    pub fn mark_cold_start_complete(&self) {
        self.cold_start_done.store(true, Ordering::Release);
    }

    /// Whether [`mark_cold_start_complete`](Self::mark_cold_start_complete) was called.
    pub fn cold_start_complete(&self) -> bool {
        self.cold_start_done.load(Ordering::Acquire)
    }

    /// Relays a host lifecycle transition.
    pub fn on_app_state(&self, state: AppState) -> ForegroundOutcome {
        self.on_app_state_with(state, ShowCallbacks::new())
    }

    /// Same as [`on_app_state`](Self::on_app_state), with callbacks for the app-open show.
    pub fn on_app_state_with(&self, state: AppState, callbacks: ShowCallbacks) -> ForegroundOutcome {
        if state == AppState::Background {
            return ForegroundOutcome::Ignored;
        }
        let ignored = if !self.cold_start_complete() {
            Some("cold_start")
        } else if !self.config().auto_show_app_open {
            Some("auto_show_disabled")
        } else if self.slots.app_open.is_none() {
            Some("app_open_disabled")
        } else {
            None
        };
        if let Some(reason) = ignored {
            self.bus
                .publish(Event::new(EventKind::ForegroundIgnored).with_reason(reason));
            return ForegroundOutcome::Ignored;
        }

        match self.slots.app_open.as_ref().map(|s| s.show_if_available(callbacks)) {
            Some(Ok(())) => ForegroundOutcome::Presented,
            Some(Err(err)) => ForegroundOutcome::Refused(err),
            None => ForegroundOutcome::Ignored,
        }
    }

    /// Interstitial slot, if enabled.
    pub fn interstitial(&self) -> Option<&InterstitialSlot> {
        self.slots.interstitial.as_ref()
    }

    /// Rewarded slot, if enabled.
    pub fn rewarded(&self) -> Option<&RewardedSlot> {
        self.slots.rewarded.as_ref()
    }

    /// Rewarded interstitial slot, if enabled.
    pub fn rewarded_interstitial(&self) -> Option<&RewardedInterstitialSlot> {
        self.slots.rewarded_interstitial.as_ref()
    }

    /// App-open slot, if enabled.
    pub fn app_open(&self) -> Option<&AppOpenSlot> {
        self.slots.app_open.as_ref()
    }

    /// Banner slot, if enabled.
    pub fn banner(&self) -> Option<&BannerSlot> {
        self.slots.banner.as_ref()
    }

    /// Shows the interstitial if one is loaded; refusals go to `on_failure`.
    pub fn show_interstitial(&self, callbacks: ShowCallbacks) -> Result<(), ShowError> {
        match &self.slots.interstitial {
            Some(slot) => slot.show(callbacks),
            None => refuse(callbacks),
        }
    }

    /// Shows the rewarded ad if one is loaded; refusals go to `on_failure`.
    pub fn show_rewarded(&self, callbacks: ShowCallbacks) -> Result<(), ShowError> {
        match &self.slots.rewarded {
            Some(slot) => slot.show(callbacks),
            None => refuse(callbacks),
        }
    }

    /// Shows the rewarded interstitial if one is loaded; refusals go to `on_failure`.
    pub fn show_rewarded_interstitial(&self, callbacks: ShowCallbacks) -> Result<(), ShowError> {
        match &self.slots.rewarded_interstitial {
            Some(slot) => slot.show(callbacks),
            None => refuse(callbacks),
        }
    }

    /// Snapshots of every enabled slot, in [`FormatKind::ALL`] order.
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.slots().map(|s| s.snapshot()).collect()
    }

    /// Whether the consent gate has reported readiness.
    pub fn consent_ready(&self) -> bool {
        *self.consent_tx.borrow()
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config_tx.borrow())
    }

    /// Receiver of every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Stops every slot and waits up to `shutdown_grace` for presentations in progress.
    ///
    /// Returns [`BrokerError::GraceExceeded`] with the formats still showing
    /// when the grace period runs out; their handles are destroyed whenever
    /// their presentation finally ends.
    pub async fn shutdown(&self) -> Result<(), BrokerError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.work.cancel();
        for slot in self.slots() {
            slot.shutdown();
        }

        let grace = self.config().shutdown_grace;
        let settled = join_all(self.slots().map(|s| s.settled()));
        if time::timeout(grace, settled).await.is_err() {
            let stuck: Vec<&'static str> = self
                .slots()
                .filter(|s| s.snapshot().destroy_pending)
                .map(|s| s.kind().as_label())
                .collect();
            self.bus
                .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(",")));
            return Err(BrokerError::GraceExceeded { grace, stuck });
        }

        self.bus.publish(Event::new(EventKind::AllStoppedWithin));
        self.root.cancel();
        let listener = self.listener.lock().take();
        if let Some(listener) = listener {
            let _ = listener.await;
        }
        Ok(())
    }

    fn slots(&self) -> impl Iterator<Item = &dyn ManagedSlot> {
        let s = &self.slots;
        [
            s.interstitial.as_ref().map(|x| x as &dyn ManagedSlot),
            s.rewarded.as_ref().map(|x| x as &dyn ManagedSlot),
            s.rewarded_interstitial.as_ref().map(|x| x as &dyn ManagedSlot),
            s.app_open.as_ref().map(|x| x as &dyn ManagedSlot),
            s.banner.as_ref().map(|x| x as &dyn ManagedSlot),
        ]
        .into_iter()
        .flatten()
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

fn refuse(callbacks: ShowCallbacks) -> Result<(), ShowError> {
    callbacks.fail(ShowError::NotReady);
    Err(ShowError::NotReady)
}

/// Forwards bus events to the subscriber set until `root` is cancelled, then drains.
fn subscriber_listener(
    rt: &Handle,
    bus: &Bus,
    subs: SubscriberSet,
    root: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    rt.spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = root.cancelled() => break,
            }
        }
        while let Ok(ev) = rx.try_recv() {
            subs.emit(&ev);
        }
        subs.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::{Placements, Platform};
    use crate::core::{ConsentFlag, OrchestratorBuilder};
    use crate::slot::SlotStatus;
    use crate::subscribers::Subscribe;
    use crate::testing::{FakeNetwork, next_of};

    fn all_formats() -> Config {
        Config {
            placements: Placements::test_ids(Platform::Android),
            ..Config::default()
        }
    }

    fn build(cfg: Config, net: &Arc<FakeNetwork>) -> Arc<Orchestrator> {
        OrchestratorBuilder::new(cfg)
            .build(net.clone())
            .expect("valid config")
    }

    async fn wait_loaded(rx: &mut broadcast::Receiver<Event>, n: usize) {
        for _ in 0..n {
            next_of(rx, EventKind::Loaded).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_load_before_consent() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        let flag = ConsentFlag::new();
        orch.start(Arc::new(flag.clone()));

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(net.request_count(), 0);
        assert!(!orch.consent_ready());
        assert_eq!(
            orch.interstitial().unwrap().load(),
            Err(LoadRejected::ConsentPending)
        );

        flag.grant();
        next_of(&mut rx, EventKind::ConsentReady).await;
        wait_loaded(&mut rx, 5).await;
        assert_eq!(net.request_count(), 5);
        assert!(orch.snapshots().iter().all(|s| s.status == SlotStatus::Ready));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_formats_have_no_slot() {
        let net = FakeNetwork::new();
        let cfg = Config {
            placements: Placements {
                banner: Some("bn".into()),
                ..Placements::default()
            },
            ..Config::default()
        };
        let orch = build(cfg, &net);
        orch.start(Arc::new(ConsentFlag::granted()));

        assert!(orch.interstitial().is_none());
        assert!(orch.app_open().is_none());
        assert_eq!(orch.snapshots().len(), 1);
        assert_eq!(
            orch.show_interstitial(ShowCallbacks::new()),
            Err(ShowError::NotReady)
        );
        assert_eq!(orch.on_app_state(AppState::Foreground), ForegroundOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_ads_destroys_and_reloads_suppressed_slots() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;

        orch.set_remove_ads(true);
        assert!(orch.config().remove_ads);
        assert_eq!(orch.interstitial().unwrap().status(), SlotStatus::Empty);
        assert_eq!(orch.app_open().unwrap().status(), SlotStatus::Empty);
        assert_eq!(orch.banner().unwrap().status(), SlotStatus::Empty);
        assert_eq!(orch.rewarded().unwrap().status(), SlotStatus::Ready);
        assert_eq!(orch.rewarded_interstitial().unwrap().status(), SlotStatus::Ready);
        assert_eq!(
            orch.show_interstitial(ShowCallbacks::new()),
            Err(ShowError::RemoveAds)
        );
        let destroyed = net.handles().iter().filter(|h| h.destroys() == 1).count();
        assert_eq!(destroyed, 3);

        orch.set_remove_ads(true);
        orch.set_remove_ads(false);
        wait_loaded(&mut rx, 3).await;
        assert_eq!(net.request_count(), 8);
        assert_eq!(orch.interstitial().unwrap().status(), SlotStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_ads_toggled_during_show_reloads_after_close() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;

        orch.show_interstitial(ShowCallbacks::new()).unwrap();
        let shown = net.handle_for(FormatKind::Interstitial);
        orch.set_remove_ads(true);
        assert!(orch.interstitial().unwrap().snapshot().destroy_pending);
        orch.set_remove_ads(false);
        assert!(!orch.interstitial().unwrap().snapshot().destroy_pending);
        wait_loaded(&mut rx, 2).await;

        shown.sink.closed();
        next_of(&mut rx, EventKind::Closed).await;
        next_of(&mut rx, EventKind::Loaded).await;

        assert!(!orch.config().remove_ads);
        assert_eq!(shown.destroys(), 1);
        assert_eq!(orch.interstitial().unwrap().status(), SlotStatus::Ready);
        assert_eq!(net.request_count(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreground_before_cold_start_is_ignored() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;

        assert_eq!(orch.on_app_state(AppState::Foreground), ForegroundOutcome::Ignored);
        let ev = next_of(&mut rx, EventKind::ForegroundIgnored).await;
        assert_eq!(ev.reason.as_deref(), Some("cold_start"));
        assert_eq!(orch.app_open().unwrap().status(), SlotStatus::Ready);

        orch.mark_cold_start_complete();
        assert_eq!(orch.on_app_state(AppState::Background), ForegroundOutcome::Ignored);
        assert_eq!(orch.on_app_state(AppState::Foreground), ForegroundOutcome::Presented);
        assert!(orch.app_open().unwrap().is_showing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreground_respects_auto_show_flag() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;
        orch.mark_cold_start_complete();

        orch.set_auto_show_app_open(false);
        assert_eq!(orch.on_app_state(AppState::Foreground), ForegroundOutcome::Ignored);
        let ev = next_of(&mut rx, EventKind::ForegroundIgnored).await;
        assert_eq!(ev.reason.as_deref(), Some("auto_show_disabled"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_deferred_destroy() {
        let net = FakeNetwork::new();
        let orch = build(all_formats(), &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;

        orch.show_interstitial(ShowCallbacks::new()).unwrap();
        let shown = net.handle_for(FormatKind::Interstitial);
        tokio::spawn({
            let shown = shown.clone();
            async move {
                time::sleep(Duration::from_secs(1)).await;
                shown.sink.closed();
            }
        });

        orch.shutdown().await.expect("settled within grace");
        next_of(&mut rx, EventKind::AllStoppedWithin).await;
        assert_eq!(net.request_count(), 5);
        for handle in net.handles() {
            assert_eq!(handle.destroys(), 1);
        }
        assert_eq!(
            orch.rewarded().unwrap().load(),
            Err(LoadRejected::ShutDown)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_reports_stuck_slots() {
        let net = FakeNetwork::new();
        let mut cfg = all_formats();
        cfg.shutdown_grace = Duration::from_secs(2);
        let orch = build(cfg, &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;
        orch.show_rewarded(ShowCallbacks::new()).unwrap();

        match orch.shutdown().await {
            Err(BrokerError::GraceExceeded { grace, stuck }) => {
                assert_eq!(grace, Duration::from_secs(2));
                assert_eq!(stuck, vec!["rewarded"]);
            }
            other => panic!("expected grace exceeded, got {other:?}"),
        }
        let ev = next_of(&mut rx, EventKind::GraceExceeded).await;
        assert_eq!(ev.reason.as_deref(), Some("rewarded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_pending_retries() {
        let net = FakeNetwork::new();
        net.fail_times(1);
        let cfg = Config {
            placements: Placements {
                interstitial: Some("it".into()),
                ..Placements::default()
            },
            ..Config::default()
        };
        let orch = build(cfg, &net);
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        next_of(&mut rx, EventKind::RetryScheduled).await;

        orch.shutdown().await.unwrap();
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(net.request_count(), 1);
        assert_eq!(orch.interstitial().unwrap().snapshot().retry_pending, None);
    }

    #[derive(Default)]
    struct Recorder {
        seen: parking_lot::Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().push(ev.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_events_until_shutdown() {
        let net = FakeNetwork::new();
        let recorder = Arc::new(Recorder::default());
        let orch = OrchestratorBuilder::new(all_formats())
            .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
            .build(net.clone())
            .unwrap();
        let mut rx = orch.subscribe();
        orch.start(Arc::new(ConsentFlag::granted()));
        wait_loaded(&mut rx, 5).await;
        orch.shutdown().await.unwrap();

        let seen = recorder.seen.lock().clone();
        assert_eq!(seen.first(), Some(&EventKind::ConsentReady));
        assert_eq!(seen.iter().filter(|k| **k == EventKind::Loaded).count(), 5);
        assert_eq!(seen.last(), Some(&EventKind::AllStoppedWithin));
    }
}
