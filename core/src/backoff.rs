use std::time::Duration;

/// BackoffPolicy bounds how many times a failed attempt may be retried and
/// how long to wait between attempts.
///
/// Whether a particular failure is retryable at all is the retry policy's
/// call; this type only answers "how many times" and "how long", so the two
/// can be tuned independently per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_retries: u32,
    delay: Duration,
}

impl BackoffPolicy {
    /// Create a policy allowing `max_retries` retries with a linearly scaled
    /// delay starting at `delay`.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// The retry bound.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether another retry is allowed after `attempt` retries so far.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay to wait before retry number `attempt + 1`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt.saturating_add(1))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_millis(50),
        }
    }
}
