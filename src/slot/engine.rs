//! # SlotEngine: lifecycle of one ad placement.
//!
//! One generic state machine serves every format; format differences are
//! injected through the [`AdFormat`] hooks.
//!
//! ```text
//! load() ──► gates ──► release old handle ──► Loading ──► spawn { network.load (timeout, cancellable) }
//!                                                                  │
//!                          on_load_complete(ticket) ◄──────────────┘
//!                            ├─ stale ticket ─► destroy handle, LoadDiscarded
//!                            ├─ Ok  ─► Ready (expiry, retry_count = 0)
//!                            └─ Err ─► Empty ─► RetryScheduler (2s, 4s, 8s) or RetriesExhausted
//!
//! show() ──► admission ──► Showing ──► handle.display()
//!                                        │
//!          relay task ◄── AdEventSink ◄──┘  Closed / FailedToShow
//!              └─► finish_show ─► release handle ─► destroy_pending ? finalize : load()
//! ```
//!
//! ## Rules
//! - A handle exists only in `Ready`/`Showing`; every handle is destroyed exactly once.
//! - Every load carries a ticket; completions and handle events with an old ticket are ignored.
//! - At most one show in flight; a second `show()` fails fast without side effects.
//! - `destroy()` during `Showing` only sets `destroy_pending`.
//! - Collaborators may be called under the slot lock (their sink only enqueues);
//!   user callbacks never are.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::{Notify, mpsc};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use super::context::SlotContext;
use super::retry::RetryScheduler;
use super::show::ShowCallbacks;
use super::state::{DestroyOutcome, SlotSnapshot, SlotStatus};
use crate::config::Config;
use crate::error::{LoadError, LoadRejected, ShowError};
use crate::events::{Event, EventKind};
use crate::formats::{AdFormat, FormatKind, FullScreenFormat};
use crate::network::{
    AdEvent, AdEventSink, AdHandle, AdNetwork, LoadRequest, RelayMessage, relay_channel,
};

/// Handle owned by the slot, tagged with the load that produced it.
struct Loaded {
    ticket: u64,
    handle: Box<dyn AdHandle>,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct SlotState {
    status: SlotStatus,
    loaded: Option<Loaded>,
    retry_count: u32,
    /// Id of the latest load request.
    ticket: u64,
    load_cancel: Option<CancellationToken>,
    retry: RetryScheduler,
    show: Option<ShowCallbacks>,
    reward_delivered: bool,
    destroy_pending: bool,
    shut_down: bool,
}

struct Inner<F: AdFormat> {
    format: F,
    placement: Arc<str>,
    network: Arc<dyn AdNetwork>,
    ctx: SlotContext,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    state: Mutex<SlotState>,
    idle: Notify,
}

/// Lifecycle engine of one placement. Cheap to clone.
pub struct SlotEngine<F: AdFormat> {
    inner: Arc<Inner<F>>,
}

impl<F: AdFormat> Clone for SlotEngine<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: AdFormat> SlotEngine<F> {
    /// Creates an `Empty` slot and spawns its relay task.
    pub(crate) fn new(
        format: F,
        placement: impl Into<Arc<str>>,
        network: Arc<dyn AdNetwork>,
        ctx: SlotContext,
    ) -> Self {
        let (relay_tx, relay_rx) = relay_channel();
        let inner = Arc::new(Inner {
            format,
            placement: placement.into(),
            network,
            ctx,
            relay_tx,
            state: Mutex::new(SlotState::default()),
            idle: Notify::new(),
        });
        Self::spawn_relay(&inner, relay_rx);
        Self { inner }
    }

    /// Drains handle events until the root token is cancelled or the slot is dropped.
    fn spawn_relay(inner: &Arc<Inner<F>>, mut rx: mpsc::UnboundedReceiver<RelayMessage>) {
        let weak: Weak<Inner<F>> = Arc::downgrade(inner);
        let root = inner.ctx.root.clone();

        inner.ctx.rt.spawn(async move {
            loop {
                let msg = tokio::select! {
                    biased;
                    _ = root.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(msg) => msg,
                        None => break,
                    },
                };
                match weak.upgrade() {
                    Some(inner) => SlotEngine { inner }.on_relay(msg),
                    None => break,
                }
            }
        });
    }

    /// Format of this slot.
    pub fn kind(&self) -> FormatKind {
        F::KIND
    }

    /// Placement id requested from the network.
    pub fn placement_id(&self) -> &str {
        &self.inner.placement
    }

    /// Current status.
    pub fn status(&self) -> SlotStatus {
        self.inner.state.lock().status
    }

    /// Whether a presentation is in progress.
    pub fn is_showing(&self) -> bool {
        self.status() == SlotStatus::Showing
    }

    /// `Ready`, displayable, and not expired.
    pub fn is_available(&self) -> bool {
        let st = self.inner.state.lock();
        st.status == SlotStatus::Ready
            && st
                .loaded
                .as_ref()
                .is_some_and(|l| l.handle.is_ready() && !is_expired(l, Instant::now()))
    }

    /// Point-in-time copy of the slot state.
    pub fn snapshot(&self) -> SlotSnapshot {
        let st = self.inner.state.lock();
        SlotSnapshot {
            format: F::KIND,
            status: st.status,
            retry_count: st.retry_count,
            is_showing: st.status == SlotStatus::Showing,
            destroy_pending: st.destroy_pending,
            has_handle: st.loaded.is_some(),
            expires_at: st.loaded.as_ref().and_then(|l| l.expires_at),
            retry_pending: st.retry.pending_delay(),
        }
    }

    /// Requests a new creative.
    ///
    /// Rejected synchronously when consent is pending, remove-ads suppresses
    /// the format, or a load or presentation is already in progress. Any
    /// loaded handle is destroyed and any armed retry timer cancelled first.
    pub fn load(&self) -> Result<(), LoadRejected> {
        let mut st = self.inner.state.lock();
        self.start_load(&mut st, 0)
    }

    /// Tears down the current handle (or in-flight load) and loads again.
    ///
    /// Refused while a presentation is in progress.
    pub fn reload(&self) -> Result<(), LoadRejected> {
        let mut st = self.inner.state.lock();
        if st.status == SlotStatus::Showing {
            return Err(LoadRejected::InFlight {
                status: SlotStatus::Showing,
            });
        }
        if st.status != SlotStatus::Empty || st.loaded.is_some() {
            self.finalize_destroy(&mut st);
        }
        self.start_load(&mut st, 0)
    }

    /// Releases the handle, cancels the retry timer and any in-flight load.
    ///
    /// During a presentation the destroy is deferred until it ends; no reload follows.
    pub fn destroy(&self) -> DestroyOutcome {
        let mut st = self.inner.state.lock();
        self.destroy_locked(&mut st)
    }

    /// Destroys the slot and refuses every later load.
    pub(crate) fn shutdown(&self) -> DestroyOutcome {
        let mut st = self.inner.state.lock();
        st.shut_down = true;
        self.destroy_locked(&mut st)
    }

    /// Withdraws a deferred destroy so the slot reloads once the presentation ends.
    ///
    /// Returns `true` if one was pending.
    pub(crate) fn cancel_deferred_destroy(&self) -> bool {
        let mut st = self.inner.state.lock();
        if st.shut_down || !st.destroy_pending {
            return false;
        }
        st.destroy_pending = false;
        self.inner.idle.notify_waiters();
        true
    }

    /// Resolves once no deferred destroy is pending.
    pub async fn wait_settled(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let pending = self.inner.state.lock().destroy_pending;
            if !pending {
                return;
            }
            notified.await;
        }
    }

    pub(crate) fn format(&self) -> &F {
        &self.inner.format
    }

    pub(crate) fn config(&self) -> Arc<Config> {
        self.inner.ctx.config()
    }

    /// Runs `f` on the handle if the slot is `Ready`.
    pub(crate) fn with_ready_handle<R>(&self, f: impl FnOnce(&dyn AdHandle) -> R) -> Option<R> {
        let st = self.inner.state.lock();
        match (&st.status, &st.loaded) {
            (SlotStatus::Ready, Some(loaded)) => Some(f(loaded.handle.as_ref())),
            _ => None,
        }
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.inner.ctx.bus.publish(ev);
    }

    /// Event of `kind` tagged with this slot.
    pub(crate) fn event(&self, kind: EventKind) -> Event {
        Event::new(kind)
            .with_format(F::KIND)
            .with_placement(Arc::clone(&self.inner.placement))
    }

    fn destroy_locked(&self, st: &mut SlotState) -> DestroyOutcome {
        if st.status == SlotStatus::Showing {
            if !st.destroy_pending {
                st.destroy_pending = true;
                self.publish(self.event(EventKind::DestroyDeferred));
            }
            return DestroyOutcome::Deferred;
        }
        self.finalize_destroy(st);
        DestroyOutcome::Destroyed
    }

    fn finalize_destroy(&self, st: &mut SlotState) {
        st.retry.cancel();
        if let Some(cancel) = st.load_cancel.take() {
            cancel.cancel();
        }
        st.ticket += 1;
        release(st);
        st.status = SlotStatus::Empty;
        st.retry_count = 0;
        st.show = None;
        st.destroy_pending = false;
        self.publish(self.event(EventKind::Destroyed));
        self.inner.idle.notify_waiters();
    }

    fn start_load(&self, st: &mut SlotState, attempt: u32) -> Result<(), LoadRejected> {
        if st.shut_down {
            return Err(LoadRejected::ShutDown);
        }
        if st.status.is_busy() {
            return Err(LoadRejected::InFlight { status: st.status });
        }
        let ctx = &self.inner.ctx;
        if !ctx.consent_ready() {
            return Err(LoadRejected::ConsentPending);
        }
        let cfg = ctx.config();
        if cfg.suppresses(F::KIND) {
            return Err(LoadRejected::RemoveAds);
        }

        st.retry.cancel();
        release(st);
        st.ticket += 1;
        let ticket = st.ticket;
        let cancel = ctx.work.child_token();
        st.load_cancel = Some(cancel.clone());
        st.status = SlotStatus::Loading;
        self.publish(self.event(EventKind::LoadStarted).with_attempt(attempt));

        let request = LoadRequest {
            format: F::KIND,
            placement_id: Arc::clone(&self.inner.placement),
            banner: self.inner.format.banner_layout(),
        };
        let sink = AdEventSink::new(ticket, self.inner.relay_tx.clone());
        let network = Arc::clone(&self.inner.network);
        let timeout = cfg.load_timeout();
        let weak = Arc::downgrade(&self.inner);

        ctx.rt.spawn(async move {
            let res = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                res = with_timeout(network.load(request, sink), timeout) => res,
            };
            match weak.upgrade() {
                Some(inner) => SlotEngine { inner }.on_load_complete(ticket, res),
                None => {
                    if let Ok(handle) = res {
                        handle.destroy();
                    }
                }
            }
        });
        Ok(())
    }

    fn on_load_complete(&self, ticket: u64, res: Result<Box<dyn AdHandle>, LoadError>) {
        let mut st = self.inner.state.lock();
        if st.ticket != ticket || st.status != SlotStatus::Loading {
            drop(st);
            if let Ok(handle) = res {
                handle.destroy();
            }
            self.publish(self.event(EventKind::LoadDiscarded).with_reason("superseded"));
            return;
        }
        st.load_cancel = None;
        let cfg = self.inner.ctx.config();

        match res {
            Ok(handle) => {
                let expires_at = self
                    .inner
                    .format
                    .time_to_live(&cfg)
                    .map(|ttl| Instant::now() + ttl);
                st.retry_count = 0;
                st.status = SlotStatus::Ready;
                self.publish(self.event(EventKind::Loaded));

                if let Some(visible) = self.inner.format.on_ready(handle.as_ref()) {
                    let applied = if visible { "visible" } else { "hidden" };
                    self.publish(self.event(EventKind::VisibilityApplied).with_reason(applied));
                }
                st.loaded = Some(Loaded {
                    ticket,
                    handle,
                    expires_at,
                });
            }
            Err(err) => {
                st.status = SlotStatus::Empty;
                let reason = err.to_string();
                self.publish(self.event(EventKind::LoadFailed).with_reason(reason.as_str()));
                self.schedule_retry(&mut st, &cfg, &reason);
            }
        }
    }

    fn schedule_retry(&self, st: &mut SlotState, cfg: &Config, reason: &str) {
        let ctx = &self.inner.ctx;
        if ctx.work.is_cancelled() {
            return;
        }
        let Some(delay) = cfg.retry.next_delay(st.retry_count) else {
            self.publish(
                self.event(EventKind::RetriesExhausted)
                    .with_attempt(st.retry_count)
                    .with_reason(reason),
            );
            return;
        };

        st.retry_count += 1;
        let attempt = st.retry_count;
        let weak = Arc::downgrade(&self.inner);
        st.retry.schedule(&ctx.rt, &ctx.work, delay, move |id| {
            if let Some(inner) = weak.upgrade() {
                SlotEngine { inner }.on_retry_fired(id, attempt);
            }
        });
        self.publish(
            self.event(EventKind::RetryScheduled)
                .with_attempt(attempt)
                .with_delay(delay)
                .with_reason(reason),
        );
    }

    fn on_retry_fired(&self, id: u64, attempt: u32) {
        let mut st = self.inner.state.lock();
        if !st.retry.claim(id) {
            return;
        }
        if let Err(rejected) = self.start_load(&mut st, attempt) {
            tracing::debug!(format = %F::KIND, attempt, reason = rejected.as_label(), "retry skipped");
        }
    }

    fn on_relay(&self, msg: RelayMessage) {
        let mut st = self.inner.state.lock();
        if st.loaded.as_ref().map(|l| l.ticket) != Some(msg.ticket) {
            tracing::trace!(format = %F::KIND, ticket = msg.ticket, "event of a released handle ignored");
            return;
        }

        match msg.event {
            AdEvent::Paid(value) => self.publish(self.event(EventKind::Paid).with_revenue(value)),
            AdEvent::Impression => self.publish(self.event(EventKind::Impression)),
            AdEvent::Clicked => self.publish(self.event(EventKind::Clicked)),
            AdEvent::Reward(reward) => {
                if !F::KIND.is_rewarded()
                    || st.status != SlotStatus::Showing
                    || st.reward_delivered
                {
                    return;
                }
                st.reward_delivered = true;
                let on_reward = st.show.as_mut().and_then(ShowCallbacks::take_reward);
                self.publish(self.event(EventKind::RewardEarned).with_reward(reward.clone()));
                drop(st);
                if let Some(f) = on_reward {
                    f(reward);
                }
            }
            AdEvent::Closed => self.finish_show(st, Ok(())),
            AdEvent::FailedToShow { message } => {
                self.finish_show(st, Err(ShowError::Presentation { message }))
            }
        }
    }

    /// Ends the presentation exactly once, then finalizes a deferred destroy or reloads.
    fn finish_show(&self, mut st: MutexGuard<'_, SlotState>, result: Result<(), ShowError>) {
        if st.status != SlotStatus::Showing {
            return;
        }
        let callbacks = st.show.take();
        self.inner
            .format
            .on_show_finished(Instant::now(), result.is_ok());
        match &result {
            Ok(()) => self.publish(self.event(EventKind::Closed)),
            Err(err) => self.publish(self.event(EventKind::ShowFailed).with_reason(err.to_string())),
        }

        release(&mut st);
        st.status = SlotStatus::Empty;
        if st.destroy_pending {
            self.finalize_destroy(&mut st);
        } else if let Err(rejected) = self.start_load(&mut st, 0) {
            tracing::debug!(format = %F::KIND, reason = rejected.as_label(), "reload after show skipped");
        }
        drop(st);

        if let Some(callbacks) = callbacks {
            match result {
                Ok(()) => callbacks.succeed(),
                Err(err) => callbacks.fail(err),
            }
        }
    }

    fn admit_show(&self, st: &SlotState, cfg: &Config, now: Instant) -> Result<(), ShowError> {
        if st.status == SlotStatus::Showing {
            return Err(ShowError::AlreadyShowing);
        }
        if cfg.suppresses(F::KIND) {
            return Err(ShowError::RemoveAds);
        }
        self.inner.format.admit_show(cfg, now)?;

        let loaded = match (&st.status, &st.loaded) {
            (SlotStatus::Ready, Some(loaded)) => loaded,
            _ => return Err(ShowError::NotReady),
        };
        if is_expired(loaded, now) {
            return Err(ShowError::Expired);
        }
        if !loaded.handle.is_ready() {
            return Err(ShowError::NotReady);
        }
        Ok(())
    }
}

impl<F: FullScreenFormat> SlotEngine<F> {
    /// Presents the loaded creative.
    ///
    /// Refusals run `on_failure` immediately, publish `ShowRejected` and are
    /// also returned. Once the presentation started, `Ok(())` is returned and
    /// the outcome arrives through the callbacks.
    pub fn show(&self, callbacks: ShowCallbacks) -> Result<(), ShowError> {
        let mut st = self.inner.state.lock();
        let cfg = self.inner.ctx.config();

        if let Err(err) = self.admit_show(&st, &cfg, Instant::now()) {
            drop(st);
            self.publish(self.event(EventKind::ShowRejected).with_reason(err.as_label()));
            callbacks.fail(err.clone());
            return Err(err);
        }

        st.status = SlotStatus::Showing;
        st.show = Some(callbacks);
        st.reward_delivered = false;
        self.publish(self.event(EventKind::ShowStarted));
        if let Some(loaded) = &st.loaded {
            loaded.handle.display();
        }
        Ok(())
    }
}

impl<F: AdFormat> Drop for Inner<F> {
    fn drop(&mut self) {
        let st = self.state.get_mut();
        st.retry.cancel();
        if let Some(cancel) = st.load_cancel.take() {
            cancel.cancel();
        }
        if st.status != SlotStatus::Showing {
            release(st);
        }
    }
}

/// Destroys the held handle, if any.
fn release(st: &mut SlotState) {
    if let Some(loaded) = st.loaded.take() {
        loaded.handle.destroy();
    }
}

fn is_expired(loaded: &Loaded, now: Instant) -> bool {
    loaded.expires_at.is_some_and(|at| now >= at)
}

async fn with_timeout<Fut>(
    fut: Fut,
    timeout: Option<Duration>,
) -> Result<Box<dyn AdHandle>, LoadError>
where
    Fut: Future<Output = Result<Box<dyn AdHandle>, LoadError>>,
{
    match timeout {
        Some(dur) => time::timeout(dur, fut)
            .await
            .unwrap_or(Err(LoadError::Timeout { timeout: dur })),
        None => fut.await,
    }
}
