//! Test doubles shared by the unit tests of every module.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::LoadError;
use crate::events::{Bus, Event, EventKind};
use crate::formats::FormatKind;
use crate::network::{AdEventSink, AdHandle, AdNetwork, LoadRequest};
use crate::slot::SlotContext;

/// Outcome of one scripted load.
#[derive(Clone, Debug)]
pub(crate) enum Script {
    Succeed,
    Fail(LoadError),
    /// Never completes.
    Hang,
}

/// Observable side of one fake handle.
pub(crate) struct HandleProbe {
    pub format: FormatKind,
    pub sink: AdEventSink,
    pub ready: AtomicBool,
    displays: AtomicUsize,
    hides: AtomicUsize,
    destroys: AtomicUsize,
}

impl HandleProbe {
    fn new(format: FormatKind, sink: AdEventSink) -> Self {
        Self {
            format,
            sink,
            ready: AtomicBool::new(true),
            displays: AtomicUsize::new(0),
            hides: AtomicUsize::new(0),
            destroys: AtomicUsize::new(0),
        }
    }

    pub fn displays(&self) -> usize {
        self.displays.load(Ordering::SeqCst)
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }
}

struct FakeHandle(Arc<HandleProbe>);

impl AdHandle for FakeHandle {
    fn is_ready(&self) -> bool {
        self.0.ready.load(Ordering::SeqCst)
    }

    fn display(&self) {
        self.0.displays.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.0.hides.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self) {
        self.0.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted network: pops one [`Script`] per request, `Succeed` once empty.
pub(crate) struct FakeNetwork {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<LoadRequest>>,
    handles: Mutex<Vec<Arc<HandleProbe>>>,
    latency: Duration,
}

impl FakeNetwork {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::from_millis(10))
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
            latency,
        })
    }

    pub fn push(&self, script: Script) {
        self.script.lock().push_back(script);
    }

    pub fn fail_times(&self, n: usize) {
        for _ in 0..n {
            self.push(Script::Fail(LoadError::NoFill));
        }
    }

    pub fn requests(&self) -> Vec<LoadRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn handles(&self) -> Vec<Arc<HandleProbe>> {
        self.handles.lock().clone()
    }

    /// Latest handle loaded for `format`.
    pub fn handle_for(&self, format: FormatKind) -> Arc<HandleProbe> {
        self.handles
            .lock()
            .iter()
            .rev()
            .find(|h| h.format == format)
            .cloned()
            .expect("no handle loaded for this format")
    }

    pub fn last_handle(&self) -> Arc<HandleProbe> {
        self.handles.lock().last().cloned().expect("no handle loaded yet")
    }
}

#[async_trait]
impl AdNetwork for FakeNetwork {
    async fn load(
        &self,
        request: LoadRequest,
        events: AdEventSink,
    ) -> Result<Box<dyn AdHandle>, LoadError> {
        let format = request.format;
        self.requests.lock().push(request);
        let script = self.script.lock().pop_front().unwrap_or(Script::Succeed);
        if !self.latency.is_zero() {
            time::sleep(self.latency).await;
        }
        match script {
            Script::Succeed => {
                let probe = Arc::new(HandleProbe::new(format, events));
                self.handles.lock().push(Arc::clone(&probe));
                Ok(Box::new(FakeHandle(probe)))
            }
            Script::Fail(err) => Err(err),
            Script::Hang => std::future::pending().await,
        }
    }
}

/// Slot wiring with the writer ends exposed to the test.
pub(crate) struct Harness {
    pub ctx: SlotContext,
    pub config: watch::Sender<Arc<Config>>,
    pub consent: watch::Sender<bool>,
    pub events: broadcast::Receiver<Event>,
}

impl Harness {
    /// Consent granted, `cfg` as configuration.
    pub fn new(cfg: Config) -> Self {
        let (config, config_rx) = watch::channel(Arc::new(cfg));
        let (consent, consent_rx) = watch::channel(true);
        let bus = Bus::new(1024);
        let events = bus.subscribe();
        let ctx = SlotContext {
            config: config_rx,
            consent: consent_rx,
            bus,
            work: CancellationToken::new(),
            root: CancellationToken::new(),
            rt: Handle::current(),
        };
        Self {
            ctx,
            config,
            consent,
            events,
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Config)) {
        self.config.send_modify(|cfg| f(Arc::make_mut(cfg)));
    }

    pub async fn next(&mut self, kind: EventKind) -> Event {
        next_of(&mut self.events, kind).await
    }
}

/// Waits (in virtual time) for the next event of `kind`.
pub(crate) async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("bus closed"),
            }
        }
    };
    time::timeout(Duration::from_secs(3_600), wait)
        .await
        .unwrap_or_else(|_| panic!("no {kind:?} event"))
}

/// Collects the kinds of every event already queued on `rx`.
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}
