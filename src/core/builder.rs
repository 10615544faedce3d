use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::orchestrator::{Orchestrator, Parts, Slots};
use crate::{
    config::Config,
    error::BrokerError,
    events::Bus,
    formats::{AdFormat, AppOpen, Banner, Interstitial, Rewarded, RewardedInterstitial},
    network::AdNetwork,
    slot::{SlotContext, SlotEngine},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for an [`Orchestrator`].
pub struct OrchestratorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every slot and broker event through dedicated
    /// workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and creates one slot per enabled format.
    ///
    /// No request is issued until [`Orchestrator::start`] sees consent.
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    pub fn build(self, network: Arc<dyn AdNetwork>) -> Result<Arc<Orchestrator>, BrokerError> {
        self.cfg.validate()?;
        let rt = Handle::current();

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let root = CancellationToken::new();
        let work = root.child_token();

        let (config_tx, config_rx) = watch::channel(Arc::new(self.cfg.clone()));
        let (consent_tx, consent_rx) = watch::channel(false);
        let ctx = SlotContext {
            config: config_rx,
            consent: consent_rx,
            bus: bus.clone(),
            work: work.clone(),
            root: root.clone(),
            rt: rt.clone(),
        };

        let ids = &self.cfg.placements;
        let slots = Slots {
            interstitial: ids
                .interstitial
                .as_deref()
                .map(|id| slot(Interstitial, id, &network, &ctx)),
            rewarded: ids
                .rewarded
                .as_deref()
                .map(|id| slot(Rewarded, id, &network, &ctx)),
            rewarded_interstitial: ids
                .rewarded_interstitial
                .as_deref()
                .map(|id| slot(RewardedInterstitial, id, &network, &ctx)),
            app_open: ids
                .app_open
                .as_deref()
                .map(|id| slot(AppOpen::new(), id, &network, &ctx)),
            banner: ids
                .banner
                .as_deref()
                .map(|id| slot(Banner::new(&self.cfg.banner), id, &network, &ctx)),
        };

        Ok(Arc::new(Orchestrator::new_internal(Parts {
            config_tx,
            consent_tx,
            bus,
            subs,
            slots,
            rt,
            work,
            root,
        })))
    }
}

fn slot<F: AdFormat>(
    format: F,
    placement: &str,
    network: &Arc<dyn AdNetwork>,
    ctx: &SlotContext,
) -> SlotEngine<F> {
    SlotEngine::new(format, placement, Arc::clone(network), ctx.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Placements;
    use crate::testing::FakeNetwork;

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let cfg = Config {
            placements: Placements {
                interstitial: Some(String::new()),
                ..Placements::default()
            },
            ..Config::default()
        };
        let err = OrchestratorBuilder::new(cfg)
            .build(FakeNetwork::new())
            .err()
            .expect("rejected");
        assert_eq!(err.as_label(), "broker_invalid_config");
    }

    #[tokio::test]
    async fn test_build_creates_idle_slots() {
        let net = FakeNetwork::new();
        let orch = OrchestratorBuilder::new(Config::default())
            .build(net.clone())
            .unwrap();
        assert!(orch.snapshots().is_empty());
        assert!(!orch.consent_ready());
        assert_eq!(net.request_count(), 0);
    }
}
