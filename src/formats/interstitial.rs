//! Full-screen interstitial.

use super::{AdFormat, FormatKind, FullScreenFormat};
use crate::slot::SlotEngine;

/// One-shot full-screen format, suppressed by remove-ads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interstitial;

impl AdFormat for Interstitial {
    const KIND: FormatKind = FormatKind::Interstitial;
}

impl FullScreenFormat for Interstitial {}

/// Interstitial slot.
pub type InterstitialSlot = SlotEngine<Interstitial>;
