//! Event sink handed to the network with every load request.

use tokio::sync::mpsc;

use super::payload::AdEvent;

/// Message drained by a slot's relay task.
#[derive(Debug)]
pub(crate) struct RelayMessage {
    /// Load ticket of the handle that fired.
    pub ticket: u64,
    pub event: AdEvent,
}

/// Creates the relay channel of one slot.
pub(crate) fn relay_channel() -> (
    mpsc::UnboundedSender<RelayMessage>,
    mpsc::UnboundedReceiver<RelayMessage>,
) {
    mpsc::unbounded_channel()
}

/// Reports callbacks of one handle back to its slot.
///
/// Cheap to clone. Emitting never blocks and never calls into the slot
/// synchronously; events of a handle the slot no longer owns are ignored.
#[derive(Clone, Debug)]
pub struct AdEventSink {
    ticket: u64,
    tx: mpsc::UnboundedSender<RelayMessage>,
}

impl AdEventSink {
    pub(crate) fn new(ticket: u64, tx: mpsc::UnboundedSender<RelayMessage>) -> Self {
        Self { ticket, tx }
    }

    /// Reports one callback. Returns `false` if the slot is gone.
    pub fn emit(&self, event: AdEvent) -> bool {
        self.tx
            .send(RelayMessage {
                ticket: self.ticket,
                event,
            })
            .is_ok()
    }

    /// Shorthand for [`AdEvent::Closed`].
    pub fn closed(&self) -> bool {
        self.emit(AdEvent::Closed)
    }

    /// Shorthand for [`AdEvent::FailedToShow`].
    pub fn failed_to_show(&self, message: impl Into<String>) -> bool {
        self.emit(AdEvent::FailedToShow {
            message: message.into(),
        })
    }
}
