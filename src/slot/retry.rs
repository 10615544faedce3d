//! # Cancellable retry timer of one slot.
//!
//! A slot owns exactly one [`RetryScheduler`]. Arming a timer cancels the
//! previous one, so at most one retry is outstanding per slot. Every timer
//! carries an id; when it fires, the slot must [`claim`](RetryScheduler::claim)
//! that id under its lock before reloading. A timer replaced or cancelled
//! between firing and claiming is therefore ignored.
//!
//! ```text
//! schedule(d) ─► cancel previous ─► id += 1 ─► spawn { select! { sleep(d) => fire(id), cancelled } }
//!                                                                   │
//!                                         slot lock ─► claim(id) ─► load()
//! ```

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time;
use tokio_util::sync::CancellationToken;

struct PendingRetry {
    id: u64,
    delay: Duration,
    cancel: CancellationToken,
}

/// Single-timer retry scheduler.
#[derive(Default)]
pub(crate) struct RetryScheduler {
    next_id: u64,
    pending: Option<PendingRetry>,
}

impl RetryScheduler {
    /// Arms a timer that calls `fire(id)` after `delay`, replacing any armed one.
    ///
    /// The timer is a child of `parent`: cancelling it disarms every slot at once.
    pub(crate) fn schedule<F>(
        &mut self,
        rt: &Handle,
        parent: &CancellationToken,
        delay: Duration,
        fire: F,
    ) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.next_id += 1;
        let id = self.next_id;
        let cancel = parent.child_token();
        let token = cancel.clone();

        rt.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                _ = time::sleep(delay) => fire(id),
            }
        });

        self.pending = Some(PendingRetry {
            id,
            delay,
            cancel,
        });
        id
    }

    /// Disarms the pending timer. Returns `true` if one was armed.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(p) => {
                p.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Consumes the pending timer if `id` is still the current one.
    pub(crate) fn claim(&mut self, id: u64) -> bool {
        match &self.pending {
            Some(p) if p.id == id => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Delay of the armed timer.
    pub(crate) fn pending_delay(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    type Fired = (mpsc::UnboundedSender<u64>, mpsc::UnboundedReceiver<u64>);

    fn scheduler() -> (RetryScheduler, CancellationToken, Fired) {
        (RetryScheduler::default(), CancellationToken::new(), mpsc::unbounded_channel())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (mut s, root, (tx, mut rx)) = scheduler();
        let id = s.schedule(&Handle::current(), &root, Duration::from_secs(2), move |id| {
            let _ = tx.send(id);
        });
        assert_eq!(s.pending_delay(), Some(Duration::from_secs(2)));

        time::sleep(Duration::from_millis(1_999)).await;
        assert!(rx.try_recv().is_err());
        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(id));
        assert!(s.claim(id));
        assert_eq!(s.pending_delay(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_cancels_previous_timer() {
        let (mut s, root, (tx, mut rx)) = scheduler();
        let tx2 = tx.clone();
        let first = s.schedule(&Handle::current(), &root, Duration::from_secs(1), move |id| {
            let _ = tx.send(id);
        });
        let second = s.schedule(&Handle::current(), &root, Duration::from_secs(3), move |id| {
            let _ = tx2.send(id);
        });

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, Some(second));
        assert!(rx.try_recv().is_err());
        assert!(!s.claim(first));
        assert!(s.claim(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancellation_disarms() {
        let (mut s, root, (tx, mut rx)) = scheduler();
        s.schedule(&Handle::current(), &root, Duration::from_secs(1), move |id| {
            let _ = tx.send(id);
        });
        root.cancel();
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, None);
    }
}
