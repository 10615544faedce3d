//! # Banner format.
//!
//! A banner has no one-shot cycle: once loaded it stays attached and its
//! visibility follows a latch. `set_visible` may be called at any time; the
//! latched value is applied to the handle as soon as one is ready.
//!
//! Changing the layout (position, size, collapsible edge) while a banner is
//! loaded or loading tears the handle down and requests a new one with the new
//! layout; the visibility latch survives the reload.

use parking_lot::Mutex;

use super::{AdFormat, FormatKind};
use crate::config::BannerConfig;
use crate::error::LoadRejected;
use crate::events::EventKind;
use crate::network::{AdHandle, BannerLayout, BannerPosition, BannerSize, Collapsible};
use crate::slot::{SlotEngine, SlotStatus};

#[derive(Debug, Clone, Copy)]
struct BannerState {
    visible: bool,
    layout: BannerLayout,
}

/// Banner format state.
#[derive(Debug)]
pub struct Banner {
    state: Mutex<BannerState>,
}

impl Banner {
    pub fn new(cfg: &BannerConfig) -> Self {
        Self {
            state: Mutex::new(BannerState {
                visible: cfg.visible,
                layout: cfg.layout(),
            }),
        }
    }
}

impl Default for Banner {
    fn default() -> Self {
        Self::new(&BannerConfig::default())
    }
}

impl AdFormat for Banner {
    const KIND: FormatKind = FormatKind::Banner;

    fn banner_layout(&self) -> Option<BannerLayout> {
        Some(self.state.lock().layout)
    }

    fn on_ready(&self, handle: &dyn AdHandle) -> Option<bool> {
        let visible = self.state.lock().visible;
        apply(handle, visible);
        Some(visible)
    }
}

fn apply(handle: &dyn AdHandle, visible: bool) {
    if visible {
        handle.display();
    } else {
        handle.hide();
    }
}

/// Banner slot.
pub type BannerSlot = SlotEngine<Banner>;

impl SlotEngine<Banner> {
    /// Latches the visibility and applies it to a loaded banner.
    pub fn set_visible(&self, visible: bool) {
        self.format().state.lock().visible = visible;
        if self.with_ready_handle(|h| apply(h, visible)).is_some() {
            let applied = if visible { "visible" } else { "hidden" };
            self.publish(self.event(EventKind::VisibilityApplied).with_reason(applied));
        }
    }

    /// Current value of the visibility latch.
    pub fn is_visible(&self) -> bool {
        self.format().state.lock().visible
    }

    /// Layout used by the next load request.
    pub fn layout(&self) -> BannerLayout {
        self.format().state.lock().layout
    }

    /// Moves the banner; reloads it if one is loaded or loading.
    pub fn set_position(&self, position: BannerPosition) -> Result<(), LoadRejected> {
        self.relayout(|layout| layout.position = position)
    }

    /// Resizes the banner; reloads it if one is loaded or loading.
    pub fn set_size(&self, size: BannerSize) -> Result<(), LoadRejected> {
        self.relayout(|layout| layout.size = size)
    }

    /// Switches the collapsible edge; reloads the banner if one is loaded or loading.
    pub fn set_collapsible(&self, collapsible: Option<Collapsible>) -> Result<(), LoadRejected> {
        self.relayout(|layout| layout.collapsible = collapsible)
    }

    fn relayout(&self, edit: impl FnOnce(&mut BannerLayout)) -> Result<(), LoadRejected> {
        let changed = {
            let mut st = self.format().state.lock();
            let before = st.layout;
            edit(&mut st.layout);
            st.layout != before
        };
        if !changed {
            return Ok(());
        }
        match self.status() {
            SlotStatus::Loading | SlotStatus::Ready => self.reload(),
            SlotStatus::Empty | SlotStatus::Showing => Ok(()),
        }
    }
}
