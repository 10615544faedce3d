//! Error types used by the broker runtime and its slots.
//!
//! This module defines four error enums:
//!
//! - [`LoadError`] — failures reported by the ad network for a load request.
//! - [`LoadRejected`] — synchronous refusals of `load()` (gates, in-flight work).
//! - [`ShowError`] — refusals and failures of `show()`.
//! - [`BrokerError`] — errors raised by the orchestrator itself.
//!
//! Every type provides `as_label` (stable snake_case string) for logs and events.

use std::time::Duration;
use thiserror::Error;

use crate::slot::SlotStatus;

/// # Errors produced by the broker runtime.
///
/// These represent failures of the orchestration layer, never of a single slot.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BrokerError {
    /// Shutdown grace period was exceeded; some slots were still presenting an ad.
    #[error("shutdown timeout {grace:?} exceeded; still showing: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Labels of the formats whose deferred destroy did not complete in time.
        stuck: Vec<&'static str>,
    },

    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it.
        reason: String,
    },
}

impl BrokerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use adbroker::BrokerError;
    /// use std::time::Duration;
    ///
    /// let err = BrokerError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "broker_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BrokerError::GraceExceeded { .. } => "broker_grace_exceeded",
            BrokerError::InvalidConfig { .. } => "broker_invalid_config",
        }
    }
}

/// # Errors reported by the ad network for a load request.
///
/// All of them are retried with backoff by the slot engine, up to the retry cap.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Transport or SDK error with the network's own error code.
    #[error("network error {code}: {message}")]
    Network {
        /// SDK-specific error code.
        code: i32,
        /// SDK-provided message.
        message: String,
    },

    /// The request succeeded but no inventory matched.
    #[error("no fill")]
    NoFill,

    /// The request did not complete within the configured load timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The request was malformed (unknown placement id, bad size...).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// SDK-provided message.
        message: String,
    },
}

impl LoadError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use adbroker::LoadError;
    ///
    /// assert_eq!(LoadError::NoFill.as_label(), "load_no_fill");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LoadError::Network { .. } => "load_network",
            LoadError::NoFill => "load_no_fill",
            LoadError::Timeout { .. } => "load_timeout",
            LoadError::InvalidRequest { .. } => "load_invalid_request",
        }
    }
}

/// # Synchronous refusals of a `load()` call.
///
/// No network request is issued when one of these is returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRejected {
    /// The consent gate has not reported readiness yet.
    #[error("consent not granted yet")]
    ConsentPending,

    /// The remove-ads entitlement suppresses this format.
    #[error("remove-ads is active")]
    RemoveAds,

    /// A load or a presentation is already in progress.
    #[error("slot busy ({status:?})")]
    InFlight {
        /// Status that caused the refusal (`Loading` or `Showing`).
        status: SlotStatus,
    },

    /// The broker has been shut down.
    #[error("broker shut down")]
    ShutDown,
}

impl LoadRejected {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LoadRejected::ConsentPending => "load_consent_pending",
            LoadRejected::RemoveAds => "load_remove_ads",
            LoadRejected::InFlight { .. } => "load_in_flight",
            LoadRejected::ShutDown => "load_shut_down",
        }
    }
}

/// # Errors delivered to the `on_failure` callback of `show()`.
///
/// All variants but [`ShowError::Presentation`] are synchronous refusals with
/// no state change. `Presentation` is reported after the display started and
/// always triggers a reload of the slot.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShowError {
    /// Another `show()` on the same slot is still in flight.
    #[error("another show is in flight")]
    AlreadyShowing,

    /// The remove-ads entitlement suppresses this format.
    #[error("remove-ads is active")]
    RemoveAds,

    /// The format's cooldown since the last display has not elapsed.
    #[error("cooldown active, {remaining:?} left")]
    Cooldown {
        /// Time left before another display is admitted.
        remaining: Duration,
    },

    /// No displayable handle is loaded.
    #[error("no ad ready")]
    NotReady,

    /// The loaded handle outlived its time-to-live.
    #[error("loaded ad expired")]
    Expired,

    /// The network failed to present the ad.
    #[error("presentation failed: {message}")]
    Presentation {
        /// SDK-provided message.
        message: String,
    },
}

impl ShowError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use adbroker::ShowError;
    ///
    /// assert_eq!(ShowError::AlreadyShowing.as_label(), "show_already_showing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShowError::AlreadyShowing => "show_already_showing",
            ShowError::RemoveAds => "show_remove_ads",
            ShowError::Cooldown { .. } => "show_cooldown",
            ShowError::NotReady => "show_not_ready",
            ShowError::Expired => "show_expired",
            ShowError::Presentation { .. } => "show_presentation_failed",
        }
    }

    /// Indicates whether the refusal happened before any state change.
    ///
    /// Returns `false` only for [`ShowError::Presentation`].
    ///
    /// # Example
    /// ```
    /// use adbroker::ShowError;
    ///
    /// assert!(ShowError::NotReady.is_rejection());
    /// assert!(!ShowError::Presentation { message: "boom".into() }.is_rejection());
    /// ```
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ShowError::Presentation { .. })
    }
}
