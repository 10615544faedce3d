//! # Backoff curve for reloading a slot after a failed load.
//!
//! [`BackoffPolicy`] maps a retry attempt to a delay:
//! - [`BackoffPolicy::first`] delay before the first retry;
//! - [`BackoffPolicy::factor`] multiplicative growth per attempt;
//! - [`BackoffPolicy::max`] upper cap.
//!
//! Attempts are 1-based: attempt `n` waits `first × factor^(n-1)`, clamped to
//! `max`, then jitter is applied. The base is derived from the attempt number
//! alone, so jitter never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use adbroker::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy::default();
//!
//! assert_eq!(backoff.delay(1), Duration::from_secs(2));
//! assert_eq!(backoff.delay(2), Duration::from_secs(4));
//! assert_eq!(backoff.delay(3), Duration::from_secs(8));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Randomization applied on top of the base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Powers of two in seconds: 2s, 4s, 8s... capped at 64s, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(2),
            max: Duration::from_secs(64),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay before retry `attempt` (1-based; `0` is treated as `1`).
    ///
    /// Non-finite or negative intermediate values fall back to [`BackoffPolicy::max`].
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_secs = self.max.as_secs_f64();
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn test_default_is_powers_of_two_seconds() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(2), Duration::from_secs(4));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
    }

    #[test]
    fn test_attempt_zero_behaves_like_first() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(0), policy.delay(1));
    }

    #[test]
    fn test_constant_factor() {
        let policy = plain(500, 30_000, 1.0);
        for attempt in 1..10 {
            assert_eq!(policy.delay(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_clamped_to_max() {
        let policy = plain(100, 1_000, 2.0);
        assert_eq!(policy.delay(10), Duration::from_secs(1));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_first_exceeds_max() {
        let policy = plain(10_000, 5_000, 2.0);
        assert_eq!(policy.delay(1), Duration::from_secs(5));
    }

    #[test]
    fn test_equal_jitter_stays_within_half_and_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..BackoffPolicy::default()
        };
        for attempt in 1..6 {
            let base = BackoffPolicy::default().delay(attempt);
            let delay = policy.delay(attempt);
            assert!(delay >= base / 2, "attempt {attempt}: {delay:?} < half of {base:?}");
            assert!(delay <= base, "attempt {attempt}: {delay:?} > {base:?}");
        }
    }

    #[test]
    fn test_full_jitter_never_exceeds_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..BackoffPolicy::default()
        };
        for attempt in 1..6 {
            assert!(policy.delay(attempt) <= BackoffPolicy::default().delay(attempt));
        }
    }

    #[test]
    fn test_decorrelated_jitter_respects_floor_and_cap() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..BackoffPolicy::default()
        };
        for _ in 0..100 {
            let delay = policy.delay(4);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay <= Duration::from_secs(48));
        }
    }
}
