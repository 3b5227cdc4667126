//! Bounded-backoff retry for the network fetch stages.
//!
//! Only the release-metadata fetch and the archive download retry; every
//! other failure in the flow is terminal on first occurrence.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::warn;

/// Exponential backoff with a fixed attempt budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the attempt after `attempt` (1-based), or `None` once
    /// the budget is spent.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        Some((self.base_delay * exp).min(self.max_delay))
    }

    /// Run `op`, sleeping between failed attempts.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => match self.backoff(attempt) {
                    Some(delay) => {
                        warn!(
                            "{what} failed (attempt {attempt}/{}): {err:#}; retrying in {delay:?}",
                            self.max_attempts
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(err),
                },
            }
        }
    }
}
