//! Rewarded formats.
//!
//! Both variants surface the reward payload through
//! [`ShowCallbacks::on_reward`](crate::ShowCallbacks::on_reward) and keep
//! serving while remove-ads is active, since the user opts in to them.

use super::{AdFormat, FormatKind, FullScreenFormat};
use crate::slot::SlotEngine;

/// Opt-in full-screen format granting a reward.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rewarded;

impl AdFormat for Rewarded {
    const KIND: FormatKind = FormatKind::Rewarded;
}

impl FullScreenFormat for Rewarded {}

/// Interstitial-style placement granting a reward.
#[derive(Debug, Default, Clone, Copy)]
pub struct RewardedInterstitial;

impl AdFormat for RewardedInterstitial {
    const KIND: FormatKind = FormatKind::RewardedInterstitial;
}

impl FullScreenFormat for RewardedInterstitial {}

/// Rewarded slot.
pub type RewardedSlot = SlotEngine<Rewarded>;

/// Rewarded interstitial slot.
pub type RewardedInterstitialSlot = SlotEngine<RewardedInterstitial>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::EventKind;
    use crate::network::{AdEvent, Reward};
    use crate::slot::ShowCallbacks;
    use crate::testing::{FakeNetwork, Harness};

    #[tokio::test(start_paused = true)]
    async fn test_rewarded_interstitial_serves_under_remove_ads() {
        let mut h = Harness::new(Config::default());
        h.update(|cfg| cfg.remove_ads = true);
        let net = FakeNetwork::new();
        let slot: RewardedInterstitialSlot =
            SlotEngine::new(RewardedInterstitial, "ri-1", net.clone(), h.ctx.clone());

        slot.load().unwrap();
        h.next(EventKind::Loaded).await;

        let (cb, rx) = ShowCallbacks::channel();
        slot.show(cb).unwrap();
        let sink = net.last_handle().sink.clone();
        sink.emit(AdEvent::Reward(Reward::new("gems", 3.0)));
        sink.closed();

        let outcome = rx.await.unwrap().unwrap();
        assert_eq!(outcome.reward, Some(Reward::new("gems", 3.0)));
    }
}
