//! Execution retry configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy knobs for the execution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum order attempts per decision.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds. Attempt `n` waits `n * delay`.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Optional overall deadline per decision in milliseconds.
    #[serde(default)]
    pub decision_deadline_ms: Option<u64>,
}

impl ExecutionConfig {
    /// Base backoff delay as a `Duration`.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Overall per-decision deadline, when configured.
    #[must_use]
    pub const fn decision_deadline(&self) -> Option<Duration> {
        match self.decision_deadline_ms {
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            decision_deadline_ms: None,
        }
    }
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_defaults() {
        let config = ExecutionConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(1_000));
        assert!(config.decision_deadline().is_none());
    }

    #[test]
    fn test_deadline_conversion() {
        let config = ExecutionConfig {
            decision_deadline_ms: Some(250),
            ..Default::default()
        };
        assert_eq!(config.decision_deadline(), Some(Duration::from_millis(250)));
    }
}
