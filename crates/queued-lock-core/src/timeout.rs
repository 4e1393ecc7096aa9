//! Timeout value helpers.

use std::time::Duration;

use tokio::time::Instant;

/// Represents how long a blocking acquire may wait.
///
/// - `Some(duration)` - Wait up to this duration
/// - `None` - Wait indefinitely
///
/// `Some(Duration::ZERO)` also waits indefinitely; a single poll is
/// requested with a non-blocking acquire instead.
pub type Timeout = Option<Duration>;

/// Tracks the time budget of one acquire loop.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Starts a deadline `timeout` from now.
    pub fn after(timeout: Timeout) -> Self {
        Self {
            start: Instant::now(),
            limit: timeout.filter(|d| !d.is_zero()),
        }
    }

    /// Time spent since the deadline was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }

    /// Time left before expiry, `None` if the deadline never expires.
    pub fn remaining(&self) -> Option<Duration> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_and_none_never_expire() {
        for timeout in [None, Some(Duration::ZERO)] {
            let deadline = Deadline::after(timeout);
            assert!(!deadline.is_expired());
            assert_eq!(deadline.remaining(), None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let deadline = Deadline::after(Some(Duration::from_millis(50)));
        assert!(!deadline.is_expired());

        tokio::time::advance(Duration::from_millis(60)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }
}
