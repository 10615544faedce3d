//! # adbroker
//!
//! **adbroker** brokers third-party ad placements (interstitial, rewarded,
//! rewarded interstitial, app-open, banner) for an application.
//!
//! Each placement is served by a [`SlotEngine`]: a small state machine that
//! interleaves asynchronous load completion, user-triggered shows, automatic
//! reload after display, exponential-backoff retries and deferred teardown
//! while an ad is on screen. The [`Orchestrator`] owns one slot per enabled
//! format and gates them all on user consent and the remove-ads entitlement.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!     │ ConsentGate  │  │ AdNetwork    │  │ host app     │
//!     │ (readiness)  │  │ (SDK facade) │  │ (foreground) │
//!     └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!            ▼                 ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - config watch (remove-ads, cooldowns, retry policy)             │
//! │  - consent watch                                                  │
//! │  - Bus + SubscriberSet                                            │
//! └──────┬──────────────┬──────────────┬──────────────┬───────────┬───┘
//!        ▼              ▼              ▼              ▼           ▼
//!   Interstitial    Rewarded    RewardedInter.     AppOpen      Banner
//!   SlotEngine     SlotEngine     SlotEngine     SlotEngine   SlotEngine
//!        │              │              │              │           │
//!        │ Publishes: LoadStarted, Loaded, LoadFailed, RetryScheduled,
//!        │            ShowStarted, Closed, Destroyed, Paid, RewardEarned...
//!        ▼              ▼              ▼              ▼           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       │   (in Orchestrator)    │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                        ┌──────────┼──────────┐
//!                        ▼          ▼          ▼
//!                    LogWriter   revenue     custom
//! ```
//!
//! ### Slot lifecycle
//! ```text
//! Empty ──load()──► Loading ──ok──► Ready ──show()──► Showing
//!   ▲                  │                                 │
//!   │                  └─err─► Empty + retry in 2s/4s/8s │ close / fail
//!   │                                                    ▼
//!   └──── destroy pending? ◄──────────────────── release handle
//!              └─ no ─► load() again (Loading)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Orchestration** | Consent gate, remove-ads, app-open on foreground, shutdown.   | [`Orchestrator`], [`OrchestratorBuilder`]  |
//! | **Slots**         | Load / show / destroy state machine, one per format.          | [`SlotEngine`], [`ShowCallbacks`]          |
//! | **Formats**       | Per-format hooks: reward, expiry, cooldown, banner layout.    | [`AdFormat`], [`AppOpen`], [`Banner`]      |
//! | **Network**       | Narrow facade over the ad SDK.                                | [`AdNetwork`], [`AdHandle`], [`AdEventSink`] |
//! | **Policies**      | Retry budget and backoff for failed loads.                    | [`RetryPolicy`], [`BackoffPolicy`]         |
//! | **Subscriber API**| Hook into slot and broker events.                             | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors for loads, shows and the broker.                 | [`LoadError`], [`ShowError`], [`BrokerError`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use adbroker::{
//!     AdEventSink, AdHandle, AdNetwork, Config, ConsentFlag, LoadError, LoadRequest, LogWriter,
//!     OrchestratorBuilder, Placements, Platform, ShowCallbacks, Subscribe,
//! };
//!
//! struct Sdk;
//! struct Creative(AdEventSink);
//!
//! impl AdHandle for Creative {
//!     fn display(&self) {
//!         self.0.closed();
//!     }
//!     fn destroy(&self) {}
//! }
//!
//! #[async_trait]
//! impl AdNetwork for Sdk {
//!     async fn load(&self, _req: LoadRequest, events: AdEventSink) -> Result<Box<dyn AdHandle>, LoadError> {
//!         Ok(Box::new(Creative(events)))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         placements: Placements::test_ids(Platform::Android),
//!         ..Config::default()
//!     };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let broker = OrchestratorBuilder::new(cfg)
//!         .with_subscribers(subs)
//!         .build(Arc::new(Sdk))?;
//!
//!     let consent = ConsentFlag::new();
//!     broker.start(Arc::new(consent.clone()));
//!     consent.grant();
//!     tokio::task::yield_now().await;
//!
//!     let (callbacks, outcome) = ShowCallbacks::channel();
//!     if broker.show_interstitial(callbacks).is_ok() {
//!         let _ = outcome.await;
//!     }
//!
//!     broker.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod formats;
mod network;
mod policies;
mod slot;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::{BannerConfig, Config, Placements, Platform};
pub use core::{
    AppState, ConsentFlag, ConsentGate, ForegroundOutcome, Orchestrator, OrchestratorBuilder,
};
pub use error::{BrokerError, LoadError, LoadRejected, ShowError};
pub use events::{Bus, Event, EventKind};
pub use formats::{
    AdFormat, AppOpen, AppOpenSlot, Banner, BannerSlot, FormatKind, FullScreenFormat,
    Interstitial, InterstitialSlot, Rewarded, RewardedInterstitial, RewardedInterstitialSlot,
    RewardedSlot,
};
pub use network::{
    AdEvent, AdEventSink, AdHandle, AdNetwork, AdValue, BannerLayout, BannerPosition, BannerSize,
    Collapsible, LoadRequest, Precision, Reward,
};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use slot::{DestroyOutcome, ShowCallbacks, ShowOutcome, SlotEngine, SlotSnapshot, SlotStatus};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
