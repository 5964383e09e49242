//! Retry policy with linear backoff for order placement.
//!
//! Transient sink failures are retried a bounded number of times with a
//! delay that grows linearly in the attempt number: `base_delay * 1` after
//! the first failure, `base_delay * 2` after the second, and so on. The
//! growth is deterministic so test runs and log timelines line up exactly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ExecutionConfig;

/// Retry policy configuration for order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of placement attempts, first try included.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; grows linearly from here.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom settings.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Derives the policy from runtime configuration.
    #[must_use]
    pub const fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            base_delay: config.retry_delay(),
        }
    }
}

/// Calculator handing out the delay to wait after each failed attempt.
///
/// Issues one fewer delay than the policy has attempts; nothing sleeps
/// after the final attempt fails.
#[derive(Debug)]
pub struct LinearBackoff {
    delays_issued: u32,
    max_delays: u32,
    base_delay: Duration,
}

impl LinearBackoff {
    /// Creates a calculator from a retry policy.
    #[must_use]
    pub const fn new(policy: &RetryPolicy) -> Self {
        Self {
            delays_issued: 0,
            max_delays: policy.max_attempts.saturating_sub(1),
            base_delay: policy.base_delay,
        }
    }

    /// Next backoff delay, or `None` once attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.delays_issued >= self.max_delays {
            return None;
        }
        self.delays_issued += 1;
        Some(self.base_delay * self.delays_issued)
    }

    /// How many delays have been handed out so far.
    #[must_use]
    pub const fn delays_issued(&self) -> u32 {
        self.delays_issued
    }

    /// Whether another retry is still allowed.
    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        self.delays_issued < self.max_delays
    }

    /// Resets the calculator for a new decision.
    pub const fn reset(&mut self) {
        self.delays_issued = 0;
    }
}
