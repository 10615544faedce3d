//! Shared wiring handed to every slot by the orchestrator.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::Bus;

/// Read-only view of broker state plus the runtime plumbing a slot needs.
///
/// - `work` cancels retry timers and in-flight loads (shutdown step one);
/// - `root` stops the relay tasks once every deferred destroy has completed.
#[derive(Clone)]
pub(crate) struct SlotContext {
    pub config: watch::Receiver<Arc<Config>>,
    pub consent: watch::Receiver<bool>,
    pub bus: Bus,
    pub work: CancellationToken,
    pub root: CancellationToken,
    pub rt: Handle,
}

impl SlotContext {
    /// Latest configuration snapshot.
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config.borrow())
    }

    /// Whether the consent gate has reported readiness.
    pub fn consent_ready(&self) -> bool {
        *self.consent.borrow()
    }
}
