//! # Example: retry_and_show
//!
//! Walks one interstitial slot through a flaky network: two failed loads are
//! retried with backoff, the third fills, the ad is shown and dismissed, and
//! the broker shuts down.
//!
//! ## Flow
//! ```text
//! start(consent granted)
//!   ├─► LoadStarted(attempt=0) → no fill → RetryScheduled(attempt=1, 100ms)
//!   ├─► LoadStarted(attempt=1) → no fill → RetryScheduled(attempt=2, 200ms)
//!   ├─► LoadStarted(attempt=2) → Loaded
//!   ├─► show_interstitial() → ShowStarted → Closed → LoadStarted (reload)
//!   └─► shutdown() → Destroyed → AllStoppedWithin
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_and_show
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use adbroker::{
    AdEventSink, AdHandle, AdNetwork, BackoffPolicy, Config, ConsentFlag, Event, EventKind,
    FormatKind, JitterPolicy, LoadError, LoadRequest, OrchestratorBuilder, Placements,
    RetryPolicy, ShowCallbacks, Subscribe,
};
use async_trait::async_trait;

/// Network that returns no fill for the first `failures` requests.
struct FlakyNetwork {
    failures: u32,
    requests: AtomicU32,
}

/// Creative that is dismissed as soon as it is displayed.
struct Creative {
    events: AdEventSink,
}

impl AdHandle for Creative {
    fn display(&self) {
        println!("[network] displaying creative");
        self.events.closed();
    }

    fn destroy(&self) {
        println!("[network] creative destroyed");
    }
}

#[async_trait]
impl AdNetwork for FlakyNetwork {
    async fn load(
        &self,
        request: LoadRequest,
        events: AdEventSink,
    ) -> Result<Box<dyn AdHandle>, LoadError> {
        let n = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[network] request #{n} for {}", request.placement_id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if n <= self.failures {
            return Err(LoadError::NoFill);
        }
        Ok(Box::new(Creative { events }))
    }
}

struct Printer;

#[async_trait]
impl Subscribe for Printer {
    async fn on_event(&self, ev: &Event) {
        let format = ev.format.map(|f| f.as_label()).unwrap_or("-");
        match (ev.attempt, ev.delay_ms) {
            (Some(attempt), Some(ms)) => {
                println!("[event] {:?} {format} attempt={attempt} delay={ms}ms", ev.kind)
            }
            (Some(attempt), None) => println!("[event] {:?} {format} attempt={attempt}", ev.kind),
            _ => println!("[event] {:?} {format}", ev.kind),
        }
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. One interstitial placement, short backoff so the demo runs fast.
    let cfg = Config {
        placements: Placements {
            interstitial: Some("demo-interstitial".into()),
            ..Placements::default()
        },
        retry: RetryPolicy {
            max_retries: 3,
            backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(1),
                factor: 2.0,
                jitter: JitterPolicy::None,
            },
        },
        shutdown_grace: Duration::from_secs(2),
        ..Config::default()
    };

    // 2. Broker over a network that fails twice before filling.
    let network = Arc::new(FlakyNetwork {
        failures: 2,
        requests: AtomicU32::new(0),
    });
    let broker = OrchestratorBuilder::new(cfg)
        .with_subscribers(vec![Arc::new(Printer) as Arc<dyn Subscribe>])
        .build(network)?;
    let mut events = broker.subscribe();

    // 3. Consent is already granted: loading starts right away.
    broker.start(Arc::new(ConsentFlag::granted()));
    loop {
        let ev = events.recv().await?;
        if ev.kind == EventKind::Loaded && ev.format == Some(FormatKind::Interstitial) {
            break;
        }
    }

    // 4. Show it; the creative closes itself on display.
    let (callbacks, outcome) = ShowCallbacks::channel();
    broker.show_interstitial(callbacks)?;
    match outcome.await? {
        Ok(_) => println!("[main] interstitial dismissed"),
        Err(err) => println!("[main] interstitial failed: {err}"),
    }

    // 5. Stop everything; the reload issued after the close is cancelled.
    broker.shutdown().await?;
    println!("[main] done.");
    Ok(())
}
