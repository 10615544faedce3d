//! # Retry policy for failed loads.
//!
//! [`RetryPolicy`] decides **whether** a failed load is retried and **when**.
//!
//! ```text
//! load fails ─► retry_count < max_retries ?
//!                 ├─ yes ─► retry_count += 1, wait backoff.delay(retry_count), load again
//!                 └─ no  ─► give up until the next explicit load()
//! ```
//!
//! With the defaults, four consecutive failures produce retries after 2s, 4s
//! and 8s, and the fourth failure schedules nothing.

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Retry budget plus backoff curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of automatic retries between two successful loads.
    pub max_retries: u32,
    /// Delay curve, indexed by the 1-based retry number.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// Three retries on the default [`BackoffPolicy`] (2s, 4s, 8s).
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn never() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Returns the delay for the next retry given the retries already spent,
    /// or `None` once the budget is exhausted.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use adbroker::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.next_delay(0), Some(Duration::from_secs(2)));
    /// assert_eq!(policy.next_delay(2), Some(Duration::from_secs(8)));
    /// assert_eq!(policy.next_delay(3), None);
    /// ```
    pub fn next_delay(&self, spent: u32) -> Option<Duration> {
        if spent >= self.max_retries {
            return None;
        }
        Some(self.backoff.delay(spent + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_then_exhausted() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..5).map(|n| policy.next_delay(n)).collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(4)),
                Some(Duration::from_secs(8)),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_never_retries() {
        assert_eq!(RetryPolicy::never().next_delay(0), None);
    }
}
