//! Plain data exchanged with the ad network.

use std::sync::Arc;

use crate::formats::FormatKind;

/// What a slot asks the network for.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    /// Format of the requesting slot.
    pub format: FormatKind,
    /// Inventory identifier.
    pub placement_id: Arc<str>,
    /// Banner layout; `None` for full-screen formats.
    pub banner: Option<BannerLayout>,
}

/// Banner layout forwarded with a banner load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BannerLayout {
    /// Anchor on screen.
    pub position: BannerPosition,
    /// Requested size.
    pub size: BannerSize,
    /// Collapsible placement, if enabled.
    pub collapsible: Option<Collapsible>,
}

/// Screen anchor of a banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BannerPosition {
    Top,
    #[default]
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    /// Absolute offset in density-independent pixels.
    Custom { x: i32, y: i32 },
}

/// Requested banner size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BannerSize {
    /// 320x50.
    #[default]
    Standard,
    /// 320x100.
    Large,
    /// 300x250.
    MediumRectangle,
    /// Full-width adaptive banner for the current orientation.
    Adaptive,
    /// Explicit size in density-independent pixels.
    Custom { width: u32, height: u32 },
}

/// Which edge a collapsible banner anchors to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collapsible {
    Top,
    Bottom,
}

/// Reward payload of a rewarded format, passed through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct Reward {
    /// Reward type as configured in the network console.
    pub kind: String,
    /// Reward amount.
    pub amount: f64,
}

impl Reward {
    /// Creates a reward payload.
    pub fn new(kind: impl Into<String>, amount: f64) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

/// Precision of a paid event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    #[default]
    Unknown,
    Estimated,
    PublisherProvided,
    Precise,
}

/// Revenue reported by a paid event.
#[derive(Clone, Debug, PartialEq)]
pub struct AdValue {
    /// Value in micros of `currency`.
    pub value_micros: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// How the value was determined.
    pub precision: Precision,
}

/// Callback of a loaded handle.
#[derive(Clone, Debug, PartialEq)]
pub enum AdEvent {
    /// The user dismissed a full-screen presentation.
    Closed,
    /// A presentation could not be shown.
    FailedToShow { message: String },
    /// Revenue was attributed to the handle.
    Paid(AdValue),
    /// An impression was recorded.
    Impression,
    /// The user clicked the creative.
    Clicked,
    /// The user earned the reward (rewarded formats).
    Reward(Reward),
}
