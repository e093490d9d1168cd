//! retry - capped exponential backoff
//!
//! # Design
//!
//! The engine itself never retries: a failed mutation must be re-run
//! from the top so the base commit is re-read. This module provides
//! the wrapper callers use to do exactly that. [`RetryPolicy::run`]
//! re-invokes the whole operation while the caller-supplied predicate
//! says the error is worth retrying, sleeping an exponentially growing,
//! capped delay between attempts.

use std::future::Future;
use std::time::Duration;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy with the given attempt count and default delays.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Delay before attempt `attempt + 1` (zero-based), capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Run `operation`, retrying while `retryable` approves the error.
    ///
    /// The final error is returned unchanged once attempts are
    /// exhausted or the predicate rejects it.
    pub async fn run<F, Fut, T, E>(
        &self,
        mut operation: F,
        retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt + 1 >= self.max_attempts.max(1) || !retryable(&err) {
                        return Err(err);
                    }
                    tokio::time::sleep(self.delay_for_attempt(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}
