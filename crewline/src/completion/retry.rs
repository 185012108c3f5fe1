//! Bounded retry policy for completion requests.

use crate::errors::CompletionError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Retry configuration for transient completion failures.
///
/// Only transport failures, timeouts, and a fixed set of status codes are
/// retried. Auth rejections and empty or undecodable responses are final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial request.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Initial delay between retries in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: f64,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum delay between retries.
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: f64,
    /// Status codes that should trigger a retry.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: HashSet<u16>,
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    30.0
}

fn default_retry_status_codes() -> HashSet<u16> {
    [429, 500, 502, 503, 504].into_iter().collect()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_seconds: default_max_delay(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Calculates the delay for a given attempt (zero-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let delay = self.retry_delay_seconds * self.backoff_multiplier.powi(attempt as i32);
        let capped = delay.min(self.max_delay_seconds);
        Duration::from_secs_f64(capped)
    }

    /// Whether a failed attempt should be retried.
    #[must_use]
    pub fn should_retry(&self, error: &CompletionError, attempt: usize) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        match error {
            CompletionError::Network { .. } | CompletionError::Timeout { .. } => true,
            CompletionError::Api { status, .. } => self.retry_status_codes.contains(status),
            CompletionError::Auth { .. }
            | CompletionError::EmptyResponse
            | CompletionError::Malformed { .. } => false,
        }
    }
}
