//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed attempt is worth repeating
//! - Provide the per-attempt delay from the configured backoff

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Retry settings resolved from [`RetryConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Always at least 1.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after the given failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        if !config.enabled {
            return Self::none();
        }
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// Decide whether an attempt should be retried.
///
/// `status` is `None` when no response was received; `transport_error` is set
/// for connection failures and timeouts.
pub fn is_retryable(status: Option<StatusCode>, transport_error: bool) -> bool {
    if transport_error {
        return true;
    }
    match status {
        Some(status) => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
        None => false,
    }
}
