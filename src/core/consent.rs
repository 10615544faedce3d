//! # Consent gate.
//!
//! The consent-collection workflow lives outside the broker. It is seen as a
//! boolean readiness gate: no slot requests an ad before it reports ready.
//!
//! [`ConsentFlag`] is a ready-made gate backed by a `tokio::sync::watch`
//! channel, for hosts that learn the outcome through a callback.
//!
//! ## Example
//! ```rust
//! use adbroker::{ConsentFlag, ConsentGate};
//!
//! let flag = ConsentFlag::new();
//! assert!(!flag.can_request_ads());
//! flag.grant();
//! assert!(flag.can_request_ads());
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

/// Readiness gate consulted before the first load.
#[async_trait]
pub trait ConsentGate: Send + Sync + 'static {
    /// Whether ads may be requested right now.
    fn can_request_ads(&self) -> bool;

    /// Resolves once ads may be requested.
    async fn ready(&self);
}

/// Watch-backed [`ConsentGate`]. Cheap to clone; clones share the flag.
#[derive(Clone, Debug)]
pub struct ConsentFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl ConsentFlag {
    /// A gate that is not ready yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A gate that is already ready.
    pub fn granted() -> Self {
        let flag = Self::new();
        flag.grant();
        flag
    }

    /// Marks the gate ready and wakes every waiter.
    pub fn grant(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for ConsentFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsentGate for ConsentFlag {
    fn can_request_ads(&self) -> bool {
        *self.tx.borrow()
    }

    async fn ready(&self) {
        let mut rx = self.tx.subscribe();
        let granted = rx.wait_for(|ready| *ready).await.is_ok();
        if !granted {
            tracing::debug!("consent flag dropped before it was granted");
        }
    }
}
