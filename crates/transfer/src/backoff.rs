use std::time::Duration;

use chunkferry_protocol::DEFAULT_BACKOFF_BASE_MS;

/// Linear backoff between delivery attempts.
///
/// The delay after a failed attempt grows linearly with the attempt
/// number: attempt 1 waits one base, attempt 2 waits two, and so on.
/// This is a pure attempt-to-delay mapping; the caller decides when and
/// how to sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay unit multiplied by the attempt number.
    pub base: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
        }
    }
}

impl BackoffPolicy {
    /// Creates a policy with the given base delay.
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_is_one_second() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.base, Duration::from_secs(1));
    }

    #[test]
    fn delays_grow_linearly() {
        let policy = BackoffPolicy::new(Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(750));
    }

    #[test]
    fn successive_delays_strictly_increase() {
        let policy = BackoffPolicy::default();
        let mut prev = Duration::ZERO;
        for attempt in 1..=10 {
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay > prev, "attempt {attempt}");
            prev = delay;
        }
    }

    #[test]
    fn huge_attempt_saturates_instead_of_panicking() {
        let policy = BackoffPolicy::new(Duration::from_secs(u64::MAX / 2));
        let _ = policy.delay_for_attempt(u32::MAX);
    }
}
