//! Retry backoff policy
//!
//! Pure mapping from a submission's recorded retry count to the wait applied
//! before its next delivery attempt. No jitter and no cap; the wait simply
//! doubles with every recorded failure, so retry pressure falls off quickly
//! for submissions the server keeps rejecting.

use std::time::Duration;

/// Base delay applied before the first retry attempt
pub const BASE_DELAY_MS: u64 = 5000;

/// Exponential backoff: `base * 2^retry_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Backoff {
    /// Create a backoff policy with a custom base delay
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Wait duration before the attempt following `retry_count` failures
    ///
    /// Saturates instead of overflowing for absurd retry counts.
    #[must_use]
    pub fn delay(&self, retry_count: u32) -> Duration {
        self.base.saturating_mul(2u32.saturating_pow(retry_count))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(BASE_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_per_retry() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), Duration::from_millis(5000));
        assert_eq!(backoff.delay(1), Duration::from_millis(10000));
        assert_eq!(backoff.delay(2), Duration::from_millis(20000));
        assert_eq!(backoff.delay(3), Duration::from_millis(40000));
        assert_eq!(backoff.delay(5), Duration::from_millis(160_000));
    }

    #[test]
    fn test_delay_saturates() {
        let backoff = Backoff::default();
        let huge = backoff.delay(u32::MAX);
        assert!(huge >= backoff.delay(62));
    }

    #[test]
    fn test_custom_base() {
        let backoff = Backoff::new(Duration::ZERO);
        assert_eq!(backoff.delay(10), Duration::ZERO);
    }
}
