//! Format adapters.
//!
//! Each placement format is a thin parameterization of the generic
//! [`SlotEngine`](crate::SlotEngine): a zero- or small-state type implementing
//! [`AdFormat`] (hooks consulted by the engine) plus format-specific methods on
//! `SlotEngine<Format>`.
//!
//! | Format                 | Remove-ads | Reward | Expiry | Extra                         |
//! |------------------------|------------|--------|--------|-------------------------------|
//! | [`Interstitial`]       | suppressed | no     | no     |                               |
//! | [`Rewarded`]           | exempt     | yes    | no     |                               |
//! | [`RewardedInterstitial`]| exempt    | yes    | no     |                               |
//! | [`AppOpen`]            | suppressed | no     | ttl    | cooldown, `show_if_available` |
//! | [`Banner`]             | suppressed | no     | no     | visibility latch, layout      |

mod app_open;
mod banner;
mod interstitial;
mod rewarded;

pub use app_open::{AppOpen, AppOpenSlot};
pub use banner::{Banner, BannerSlot};
pub use interstitial::{Interstitial, InterstitialSlot};
pub use rewarded::{Rewarded, RewardedInterstitial, RewardedInterstitialSlot, RewardedSlot};

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::Config;
use crate::error::ShowError;
use crate::network::{AdHandle, BannerLayout};

/// Placement format of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Interstitial,
    Rewarded,
    RewardedInterstitial,
    AppOpen,
    Banner,
}

impl FormatKind {
    /// Every format, in orchestrator order.
    pub const ALL: [FormatKind; 5] = [
        FormatKind::Interstitial,
        FormatKind::Rewarded,
        FormatKind::RewardedInterstitial,
        FormatKind::AppOpen,
        FormatKind::Banner,
    ];

    /// Short stable label (snake_case).
    pub fn as_label(&self) -> &'static str {
        match self {
            FormatKind::Interstitial => "interstitial",
            FormatKind::Rewarded => "rewarded",
            FormatKind::RewardedInterstitial => "rewarded_interstitial",
            FormatKind::AppOpen => "app_open",
            FormatKind::Banner => "banner",
        }
    }

    /// Formats that grant a reward to the user.
    pub fn is_rewarded(&self) -> bool {
        matches!(self, FormatKind::Rewarded | FormatKind::RewardedInterstitial)
    }

    /// Monetized formats switched off by the remove-ads entitlement.
    pub fn suppressed_by_remove_ads(&self) -> bool {
        !self.is_rewarded()
    }

    /// Formats following the one-shot show/close/reload cycle.
    pub fn is_full_screen(&self) -> bool {
        !matches!(self, FormatKind::Banner)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Format-specific hooks consulted by the slot engine.
///
/// Hooks run with the slot lock held: they must not call back into the slot.
pub trait AdFormat: Send + Sync + 'static {
    /// Which format this is.
    const KIND: FormatKind;

    /// Lifetime of a loaded handle; `None` means it never expires.
    fn time_to_live(&self, _cfg: &Config) -> Option<Duration> {
        None
    }

    /// Extra admission check for `show()`, after the in-flight and remove-ads checks.
    fn admit_show(&self, _cfg: &Config, _now: Instant) -> Result<(), ShowError> {
        Ok(())
    }

    /// Called when a presentation ends, `closed == true` for a normal dismissal.
    fn on_show_finished(&self, _now: Instant, _closed: bool) {}

    /// Banner layout to send with load requests.
    fn banner_layout(&self) -> Option<BannerLayout> {
        None
    }

    /// Called when a fresh handle becomes ready. Returns the visibility applied, if any.
    fn on_ready(&self, _handle: &dyn AdHandle) -> Option<bool> {
        None
    }
}

/// Marker for formats that follow the one-shot show/close/reload cycle.
pub trait FullScreenFormat: AdFormat {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_ads_spares_rewarded_formats() {
        let suppressed: Vec<_> = FormatKind::ALL
            .into_iter()
            .filter(|k| k.suppressed_by_remove_ads())
            .collect();
        assert_eq!(
            suppressed,
            vec![FormatKind::Interstitial, FormatKind::AppOpen, FormatKind::Banner]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(FormatKind::RewardedInterstitial.to_string(), "rewarded_interstitial");
        assert!(!FormatKind::Banner.is_full_screen());
    }
}
