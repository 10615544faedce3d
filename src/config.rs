//! # Broker configuration.
//!
//! [`Config`] is the read-only snapshot every slot consults at its decision
//! points. The orchestrator is its single writer: it publishes new snapshots
//! through a `tokio::sync::watch` channel (for instance when the remove-ads
//! entitlement changes) and slots read the latest one.
//!
//! ## Sentinel values
//! - `load_timeout = 0s` → no timeout (the network's own timeout applies)
//! - `bus_capacity = 0` → clamped to 1
//! - a `None` placement id → the format is disabled

use std::time::Duration;

use crate::error::BrokerError;
use crate::formats::FormatKind;
use crate::network::{BannerLayout, BannerPosition, BannerSize, Collapsible};
use crate::policies::RetryPolicy;

/// Target platform, used to pick per-platform placement ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

/// Placement identifiers per format. `None` disables the format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placements {
    pub interstitial: Option<String>,
    pub rewarded: Option<String>,
    pub rewarded_interstitial: Option<String>,
    pub app_open: Option<String>,
    pub banner: Option<String>,
}

impl Placements {
    /// Returns the placement id of `kind`, if the format is enabled.
    pub fn get(&self, kind: FormatKind) -> Option<&str> {
        match kind {
            FormatKind::Interstitial => self.interstitial.as_deref(),
            FormatKind::Rewarded => self.rewarded.as_deref(),
            FormatKind::RewardedInterstitial => self.rewarded_interstitial.as_deref(),
            FormatKind::AppOpen => self.app_open.as_deref(),
            FormatKind::Banner => self.banner.as_deref(),
        }
    }

    /// Public demo ad units that always fill with test creatives.
    pub fn test_ids(platform: Platform) -> Self {
        let ids = match platform {
            Platform::Android => [
                "ca-app-pub-3940256099942544/1033173712",
                "ca-app-pub-3940256099942544/5224354917",
                "ca-app-pub-3940256099942544/5354046379",
                "ca-app-pub-3940256099942544/9257395921",
                "ca-app-pub-3940256099942544/6300978111",
            ],
            Platform::Ios => [
                "ca-app-pub-3940256099942544/4411468910",
                "ca-app-pub-3940256099942544/1712485313",
                "ca-app-pub-3940256099942544/6978759866",
                "ca-app-pub-3940256099942544/5575463023",
                "ca-app-pub-3940256099942544/2934735716",
            ],
        };
        let [interstitial, rewarded, rewarded_interstitial, app_open, banner] =
            ids.map(|id| Some(id.to_string()));
        Self {
            interstitial,
            rewarded,
            rewarded_interstitial,
            app_open,
            banner,
        }
    }
}

/// Banner preferences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BannerConfig {
    /// Initial anchor.
    pub position: BannerPosition,
    /// Initial size.
    pub size: BannerSize,
    /// Request a collapsible banner anchored to this edge.
    pub collapsible: Option<Collapsible>,
    /// Initial value of the visibility latch.
    pub visible: bool,
}

impl BannerConfig {
    /// Layout sent with the first load request.
    pub fn layout(&self) -> BannerLayout {
        BannerLayout {
            position: self.position,
            size: self.size,
            collapsible: self.collapsible,
        }
    }
}

/// Configuration snapshot consulted by every slot.
#[derive(Clone, Debug)]
pub struct Config {
    /// Placement ids; formats without one are not created.
    pub placements: Placements,

    /// Remove-ads entitlement. Suppresses every non-rewarded format.
    pub remove_ads: bool,

    /// Show an app-open ad when the app returns to the foreground.
    pub auto_show_app_open: bool,

    /// Minimum time between two app-open displays.
    pub app_open_cooldown: Duration,

    /// Lifetime of a loaded app-open ad.
    pub app_open_ttl: Duration,

    /// Banner preferences.
    pub banner: BannerConfig,

    /// Retry budget and backoff for failed loads.
    pub retry: RetryPolicy,

    /// Per-request load timeout (`0s` = none).
    pub load_timeout: Duration,

    /// Capacity of the event bus ring buffer.
    pub bus_capacity: usize,

    /// How long shutdown waits for presentations in progress to end.
    pub shutdown_grace: Duration,
}

impl Config {
    /// Returns the load timeout as an `Option`.
    #[inline]
    pub fn load_timeout(&self) -> Option<Duration> {
        if self.load_timeout == Duration::ZERO {
            None
        } else {
            Some(self.load_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Whether the remove-ads entitlement currently suppresses `kind`.
    #[inline]
    pub fn suppresses(&self, kind: FormatKind) -> bool {
        self.remove_ads && kind.suppressed_by_remove_ads()
    }

    /// Checks the values that would make slots misbehave.
    pub fn validate(&self) -> Result<(), BrokerError> {
        for kind in FormatKind::ALL {
            if let Some(id) = self.placements.get(kind) {
                if id.trim().is_empty() {
                    return Err(BrokerError::InvalidConfig {
                        reason: format!("empty placement id for {kind}"),
                    });
                }
            }
        }
        let backoff = &self.retry.backoff;
        if !backoff.factor.is_finite() || backoff.factor <= 0.0 {
            return Err(BrokerError::InvalidConfig {
                reason: format!("backoff factor must be positive, got {}", backoff.factor),
            });
        }
        if backoff.first > backoff.max {
            return Err(BrokerError::InvalidConfig {
                reason: "backoff first delay exceeds max".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - no placements (every format disabled)
    /// - `remove_ads = false`, `auto_show_app_open = true`
    /// - `app_open_cooldown = 30s`, `app_open_ttl = 4h`
    /// - `retry = RetryPolicy::default()` (3 retries, 2s/4s/8s)
    /// - `load_timeout = 0s` (none), `bus_capacity = 1024`, `shutdown_grace = 5s`
    fn default() -> Self {
        Self {
            placements: Placements::default(),
            remove_ads: false,
            auto_show_app_open: true,
            app_open_cooldown: Duration::from_secs(30),
            app_open_ttl: Duration::from_secs(4 * 60 * 60),
            banner: BannerConfig::default(),
            retry: RetryPolicy::default(),
            load_timeout: Duration::ZERO,
            bus_capacity: 1024,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}
